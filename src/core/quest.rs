//! Quest definitions

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::requirements::Requirement;
use crate::state::{GameSnapshot, QuestId, QuestState, QuestVar};
use crate::steps::{QuestStep, StepId};

/// Which list of a quest a requirement belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequirementSection {
    General,
    GeneralRecommended,
    Items,
    ItemsRecommended,
    /// Listed on the highlighted panel
    Panel,
}

/// A titled group of steps shown together in the side panel
#[derive(Debug, Clone)]
pub struct Panel {
    pub title: String,
    pub steps: Vec<Arc<QuestStep>>,
    pub requirements: Vec<Requirement>,
    /// Progress values this panel covers; `None` relies on step membership only
    pub progress_values: Option<BTreeSet<i32>>,
}

impl Panel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            steps: Vec::new(),
            requirements: Vec::new(),
            progress_values: None,
        }
    }

    pub fn with_step(mut self, step: impl Into<Arc<QuestStep>>) -> Self {
        self.steps.push(step.into());
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn with_progress_values(mut self, values: impl IntoIterator<Item = i32>) -> Self {
        self.progress_values = Some(values.into_iter().collect());
        self
    }

    /// Whether the step `id` or one of its substeps is listed in this panel
    pub fn contains_step(&self, id: &StepId) -> bool {
        self.steps.iter().any(|step| step.contains(id))
    }

    pub fn covers_progress(&self, progress: i32) -> bool {
        self.progress_values
            .as_ref()
            .map_or(false, |values| values.contains(&progress))
    }
}

/// A quest: its progress variable, step map, requirements and panels
#[derive(Debug, Clone)]
pub struct Quest {
    id: QuestId,
    name: String,
    var: QuestVar,
    steps: BTreeMap<i32, Arc<QuestStep>>,
    requirements: Vec<(RequirementSection, Requirement)>,
    panels: Vec<Panel>,
}

impl Quest {
    pub fn new(id: impl Into<QuestId>, name: impl Into<String>, var: QuestVar) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            var,
            steps: BTreeMap::new(),
            requirements: Vec::new(),
            panels: Vec::new(),
        }
    }

    /// Show `step` while the progress variable equals `progress`
    pub fn with_step(mut self, progress: i32, step: impl Into<Arc<QuestStep>>) -> Self {
        self.steps.insert(progress, step.into());
        self
    }

    pub fn with_requirement(mut self, section: RequirementSection, requirement: Requirement) -> Self {
        self.requirements.push((section, requirement));
        self
    }

    pub fn with_panel(mut self, panel: Panel) -> Self {
        self.panels.push(panel);
        self
    }

    pub fn id(&self) -> &QuestId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn var(&self) -> QuestVar {
        self.var
    }

    pub fn steps(&self) -> &BTreeMap<i32, Arc<QuestStep>> {
        &self.steps
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Current value of the progress variable
    pub fn progress(&self, snapshot: &GameSnapshot) -> i32 {
        self.var.read(snapshot)
    }

    /// Step registered for a progress value
    pub fn step_for(&self, progress: i32) -> Option<&Arc<QuestStep>> {
        self.steps.get(&progress)
    }

    pub fn state(&self, snapshot: &GameSnapshot) -> QuestState {
        snapshot.quest_state(&self.id)
    }

    /// Requirements in one section, in authoring order
    pub fn requirements(&self, section: RequirementSection) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .filter(move |(s, _)| *s == section)
            .map(|(_, req)| req)
    }

    /// Every requirement with its section, in authoring order
    pub fn all_requirements(&self) -> impl Iterator<Item = (RequirementSection, &Requirement)> {
        self.requirements.iter().map(|(s, req)| (*s, req))
    }

    /// Quest requirements followed by those of the panel at `panel`
    pub fn visible_requirements(
        &self,
        panel: Option<usize>,
    ) -> impl Iterator<Item = (RequirementSection, &Requirement)> {
        let panel_reqs = panel
            .and_then(|index| self.panels.get(index))
            .map(|p| p.requirements.as_slice())
            .unwrap_or_default();

        self.all_requirements()
            .chain(panel_reqs.iter().map(|req| (RequirementSection::Panel, req)))
    }

    /// Record latched conditions held by any requirement, panels included
    pub fn collect_requirement_latches(&self, snapshot: &GameSnapshot, out: &mut BTreeSet<String>) {
        let panel_reqs = self.panels.iter().flat_map(|p| p.requirements.iter());
        for req in self.requirements.iter().map(|(_, req)| req).chain(panel_reqs) {
            req.collect_latches(snapshot, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::steps::{ConditionalStep, Step};

    fn quest() -> Quest {
        let dig = ConditionalStep::new("dig", "Dig", Step::new("get-spade", "Get a spade."))
            .with_step(
                crate::conditions::Condition::item(1265, 1),
                Step::new("dig-mound", "Dig the mound."),
            );

        Quest::new("shilo-village", "Shilo Village", QuestVar::Varbit(116))
            .with_step(0, Step::new("start", "Talk to Mosol Rei."))
            .with_step(2, dig)
            .with_requirement(RequirementSection::Items, Requirement::item("Spade", 1265, 1))
            .with_requirement(RequirementSection::General, Requirement::skill(crate::state::Skill::Agility, 32))
            .with_requirement(RequirementSection::Items, Requirement::item("Rope", 954, 1))
    }

    #[test]
    fn test_step_for_progress() {
        let quest = quest();
        assert_eq!(quest.step_for(0).unwrap().id().as_str(), "start");
        assert_eq!(quest.step_for(2).unwrap().id().as_str(), "dig");
        assert!(quest.step_for(1).is_none());

        let snapshot = GameSnapshot::new().with_varbit(116, 2);
        assert_eq!(quest.progress(&snapshot), 2);
    }

    #[test]
    fn test_requirement_sections() {
        let quest = quest();
        let items: Vec<_> = quest.requirements(RequirementSection::Items).map(|r| r.name.as_str()).collect();
        assert_eq!(items, vec!["Spade", "Rope"]);
        assert_eq!(quest.requirements(RequirementSection::General).count(), 1);
        assert_eq!(quest.all_requirements().count(), 3);
    }

    #[test]
    fn test_visible_requirements_include_panel() {
        let quest = quest()
            .with_panel(Panel::new("Starting off"))
            .with_panel(Panel::new("The mound").with_requirement(Requirement::item("Candle", 36, 1)));

        assert_eq!(quest.visible_requirements(None).count(), 3);
        assert_eq!(quest.visible_requirements(Some(0)).count(), 3);
        assert_eq!(quest.visible_requirements(Some(7)).count(), 3);

        let last = quest.visible_requirements(Some(1)).last().unwrap();
        assert_eq!(last.0, RequirementSection::Panel);
        assert_eq!(last.1.name, "Candle");
    }

    #[test]
    fn test_requirement_latches_cover_panels() {
        use crate::conditions::{ComparisonOp, Condition};

        let quest = quest().with_panel(Panel::new("The mound").with_requirement(Requirement::new(
            "Spoke to Trufitus",
            Condition::latched("trufitus", Condition::varbit(117, ComparisonOp::Equal, 1)),
        )));

        let mut latches = BTreeSet::new();
        quest.collect_requirement_latches(&GameSnapshot::new().with_varbit(117, 1), &mut latches);
        assert!(latches.contains("trufitus"));
    }

    #[test]
    fn test_panel_membership() {
        let panel = Panel::new("Investigating")
            .with_step(Step::new("fissure", "Enter the fissure.").with_substep(Step::new("use-rope", "Use a rope.")))
            .with_progress_values([3, 4]);

        assert!(panel.contains_step(&"use-rope".into()));
        assert!(!panel.contains_step(&"dig-mound".into()));
        assert!(panel.covers_progress(4));
        assert!(!Panel::new("Empty").covers_progress(4));
    }
}
