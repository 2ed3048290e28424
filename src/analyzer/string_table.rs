use std::fmt;

use log::debug;

#[derive(Clone, Debug, PartialEq)]
pub struct StringEntry {
    /// `_S0`, `_S1`, ...
    pub label: String,
    /// The literal including its quotes.
    pub text: String,
}

/// Pool of string literals written by `write`/`writeln`.
#[derive(Clone, Debug, Default)]
pub struct StringTable {
    entries: Vec<StringEntry>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the label for `literal`, adding it if it is new.
    pub fn intern(&mut self, literal: &str) -> &str {
        // MASM rejects empty strings
        let text = if literal == "\"\"" { "\" \"" } else { literal };

        let index = match self.entries.iter().position(|e| e.text == text) {
            Some(index) => index,
            None => {
                let label = format!("_S{}", self.entries.len());
                debug!("interned {} as {}", text, label);
                self.entries.push(StringEntry {
                    label,
                    text: text.to_string(),
                });
                self.entries.len() - 1
            }
        };
        &self.entries[index].label
    }

    pub fn lookup(&self, label: &str) -> Option<&StringEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn entries(&self) -> &[StringEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for StringTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name  Value\n----  -----")?;
        for e in &self.entries {
            writeln!(f, "{}   {}", e.label, e.text)?;
        }
        Ok(())
    }
}
