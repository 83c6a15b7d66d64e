//! Lazy element selectors.
//!
//! A [`Locator`] is only a Playwright selector string. Every driver call
//! resolves it against the live page again, so a locator stays valid across
//! list mutations and never points at a stale node.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    selector: String,
}

impl Locator {
    /// CSS selector (Playwright css engine, so `:has-text()` is allowed)
    pub fn css(selector: impl Into<String>) -> Self {
        Self { selector: selector.into() }
    }

    pub fn xpath(path: &str) -> Self {
        Self::css(format!("xpath={}", path))
    }

    /// ARIA role with an accessible name, e.g. `role("button", "保存")`
    pub fn role(role: &str, name: &str) -> Self {
        Self::css(format!("role={}[name=\"{}\"]", role, escape(name)))
    }

    /// Like [`Locator::role`] but the accessible name must match exactly
    pub fn role_exact(role: &str, name: &str) -> Self {
        Self::css(format!("role={}[name=\"{}\"s]", role, escape(name)))
    }

    /// Input with the given placeholder
    pub fn placeholder(text: &str) -> Self {
        Self::css(format!("[placeholder=\"{}\"]", escape(text)))
    }

    /// Element whose whole text equals `text`
    pub fn text(text: &str) -> Self {
        Self::css(format!("text=\"{}\"", escape(text)))
    }

    /// Element whose text contains `text`
    pub fn text_contains(text: &str) -> Self {
        Self::css(format!("text={}", text))
    }

    /// Descendant of this locator matching `child`
    pub fn within(&self, child: &Locator) -> Self {
        Self::css(format!("{} >> {}", self.selector, child.selector))
    }

    /// Shorthand for `within(&Locator::css(css))`
    pub fn find(&self, css: &str) -> Self {
        self.within(&Locator::css(css))
    }

    /// Descendant with exact text
    pub fn find_text(&self, text: &str) -> Self {
        self.within(&Locator::text(text))
    }

    /// Zero-based match index
    pub fn nth(&self, index: usize) -> Self {
        Self::css(format!("{} >> nth={}", self.selector, index))
    }

    pub fn first(&self) -> Self {
        self.nth(0)
    }

    pub fn last(&self) -> Self {
        Self::css(format!("{} >> nth=-1", self.selector))
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chaining() {
        let groups = Locator::css("section.groups > ul.groups > li");
        let name = groups.nth(2).find("h5");
        assert_eq!(name.selector(), "section.groups > ul.groups > li >> nth=2 >> h5");
        assert_eq!(groups.last().selector(), "section.groups > ul.groups > li >> nth=-1");
    }

    #[test]
    fn test_role_and_text_quote_names() {
        assert_eq!(Locator::role("button", "削除").selector(), "role=button[name=\"削除\"]");
        assert_eq!(Locator::text("say \"hi\"").selector(), "text=\"say \\\"hi\\\"\"");
        assert_eq!(
            Locator::role_exact("listitem", "方法").selector(),
            "role=listitem[name=\"方法\"s]"
        );
    }
}
