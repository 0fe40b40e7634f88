//! Parsing of engine-reported physical type strings
//!
//! Type strings look like `base(params) modifiers`: `int(11) unsigned`,
//! `decimal(10,2)`, `enum('a','b''c')`, `nvarchar(max)`, `double precision`.
//! Parameters are split on top-level commas, ignoring commas inside quoted
//! enum values.

/// A physical type string broken into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalType {
    /// Lowercased base name; multi-word names keep one space between words
    pub base: String,
    /// Raw parameter texts, trimmed, quotes untouched
    pub params: Vec<String>,
    /// Lowercased trailing words such as `unsigned` or `zerofill`
    pub modifiers: Vec<String>,
}

impl PhysicalType {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (head, params, tail) = match raw.find('(') {
            Some(open) => match matching_paren(raw, open) {
                Some(close) => (
                    &raw[..open],
                    split_params(&raw[open + 1..close]),
                    &raw[close + 1..],
                ),
                None => (raw, Vec::new(), ""),
            },
            None => (raw, Vec::new(), ""),
        };

        // Words before the parameter list belong to the base name unless they
        // are modifiers (`int unsigned` when no display width is reported)
        let mut base_words = Vec::new();
        let mut modifiers = Vec::new();
        for word in head.split_whitespace() {
            let word = word.to_lowercase();
            if !base_words.is_empty() && is_modifier(&word) {
                modifiers.push(word);
            } else if modifiers.is_empty() {
                base_words.push(word);
            } else {
                modifiers.push(word);
            }
        }
        modifiers.extend(tail.split_whitespace().map(str::to_lowercase));

        Self {
            base: base_words.join(" "),
            params,
            modifiers,
        }
    }

    /// Numeric parameter at `index`
    #[must_use]
    pub fn param_u32(&self, index: usize) -> Option<u32> {
        self.params.get(index)?.trim().parse().ok()
    }

    #[must_use]
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

fn is_modifier(word: &str) -> bool {
    matches!(word, "unsigned" | "signed" | "zerofill")
}

/// Index of the `)` closing the `(` at `open`, skipping quoted text
fn matching_paren(raw: &str, open: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_quote = false;
    let mut chars = raw[open..].char_indices().peekable();
    while let Some((i, ch)) = chars.next() {
        match ch {
            '\'' if in_quote => {
                if chars.peek().is_some_and(|(_, c)| *c == '\'') {
                    chars.next();
                } else {
                    in_quote = false;
                }
            }
            '\'' => in_quote = true,
            '(' if !in_quote => depth += 1,
            ')' if !in_quote => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside quotes
fn split_params(body: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' if in_quote => {
                current.push(ch);
                if chars.peek() == Some(&'\'') {
                    current.push('\'');
                    chars.next();
                } else {
                    in_quote = false;
                }
            }
            '\'' => {
                in_quote = true;
                current.push(ch);
            }
            ',' if !in_quote => params.push(core::mem::take(&mut current).trim().to_string()),
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() || !params.is_empty() {
        params.push(current.trim().to_string());
    }
    params
}
