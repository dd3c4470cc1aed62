//! Element locators shared by the live and snapshot page drivers.
//!
//! A locator is a chain of CSS steps. Each step selects descendants of the
//! nodes matched so far and may pin one of them by position, so
//! `Locator::css(".infotable tr").nth(2).child("td.data")` reads "the data
//! cell of the third info-table row".

use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    pub selector: String,
    pub index: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            steps: vec![Step {
                selector: selector.into(),
                index: None,
            }],
        }
    }

    /// Keep only the `index`-th match of the last step.
    pub fn nth(mut self, index: usize) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.index = Some(index);
        }
        self
    }

    pub fn first(self) -> Self {
        self.nth(0)
    }

    /// Descend into the current matches.
    pub fn child(mut self, selector: impl Into<String>) -> Self {
        self.steps.push(Step {
            selector: selector.into(),
            index: None,
        });
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// JSON form consumed by [`RESOLVER_JS`].
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.steps).unwrap_or_else(|_| "[]".to_string())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" >> ")?;
            }
            f.write_str(&step.selector)?;
            if let Some(index) = step.index {
                write!(f, " >> nth={}", index)?;
            }
        }
        Ok(())
    }
}

/// In-page resolver: takes the step list and returns the matched elements in
/// document order.
pub const RESOLVER_JS: &str = r#"
(steps) => {
    let scope = [document];
    for (const step of steps) {
        let next = [];
        for (const node of scope) {
            next.push(...node.querySelectorAll(step.selector));
        }
        if (step.index !== null) {
            next = step.index < next.length ? [next[step.index]] : [];
        }
        scope = next;
    }
    return scope;
}
"#;

/// Wrap `body` in a script that binds the resolved elements to `nodes`.
///
/// The value `body` returns comes back JSON-encoded as a string, so `null`
/// survives the trip.
pub fn script_for(locator: &Locator, body: &str) -> String {
    format!(
        "JSON.stringify((() => {{ const nodes = ({})({}); {} }})())",
        RESOLVER_JS,
        locator.to_json(),
        body
    )
}
