//! Step text templates
//!
//! Placeholders are substituted from the snapshot when the text is rendered:
//! `{varbit:N}`, `{varp:N}` and `{item:N}` (inventory count of item `N`).
//! Anything else inside braces is left untouched.

use serde::{Deserialize, Serialize};

use crate::state::{GameSnapshot, ItemContainer};

/// Display text that may reference live variable state
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextTemplate(String);

impl TextTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The unrendered template
    pub fn raw(&self) -> &str {
        &self.0
    }

    pub fn has_placeholders(&self) -> bool {
        let mut rest = self.0.as_str();
        while let Some(start) = rest.find('{') {
            match rest[start..].find('}') {
                Some(end) if parse_placeholder(&rest[start + 1..start + end]).is_some() => return true,
                Some(end) => rest = &rest[start + end + 1..],
                None => return false,
            }
        }
        false
    }

    /// Substitute placeholders with values from the snapshot
    pub fn render(&self, snapshot: &GameSnapshot) -> String {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start..];
            let Some(end) = after.find('}') else {
                out.push_str(after);
                return out;
            };

            match parse_placeholder(&after[1..end]) {
                Some(placeholder) => out.push_str(&placeholder.value(snapshot).to_string()),
                None => out.push_str(&after[..=end]),
            }
            rest = &after[end + 1..];
        }

        out.push_str(rest);
        out
    }
}

impl From<&str> for TextTemplate {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextTemplate {
    fn from(text: String) -> Self {
        Self(text)
    }
}

enum Placeholder {
    Varbit(u32),
    VarPlayer(u32),
    Item(u32),
}

impl Placeholder {
    fn value(&self, snapshot: &GameSnapshot) -> i64 {
        match self {
            Placeholder::Varbit(id) => snapshot.varbit(*id) as i64,
            Placeholder::VarPlayer(id) => snapshot.varp(*id) as i64,
            Placeholder::Item(id) => snapshot.item_count(&[*id], ItemContainer::Inventory) as i64,
        }
    }
}

fn parse_placeholder(body: &str) -> Option<Placeholder> {
    let (kind, id) = body.split_once(':')?;
    let id = id.trim().parse().ok()?;
    match kind.trim() {
        "varbit" => Some(Placeholder::Varbit(id)),
        "varp" => Some(Placeholder::VarPlayer(id)),
        "item" => Some(Placeholder::Item(id)),
        _ => None,
    }
}
