//! Naming helpers for code generation
//!
//! Pure case conversions used for file names, identifiers and template
//! filters. All of them are total: empty input yields empty output.

use inflector::Inflector;

/// Case conversion helpers
pub struct TemplateHelpers;

impl TemplateHelpers {
    /// Convert string to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_snake_case("UserProfile"), "user_profile");
    /// assert_eq!(TemplateHelpers::to_snake_case("CreatedAt"), "created_at");
    /// ```
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to `PascalCase`
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_pascal_case("user_profile"), "UserProfile");
    /// assert_eq!(TemplateHelpers::to_pascal_case("title"), "Title");
    /// ```
    #[must_use]
    pub fn to_pascal_case(input: &str) -> String {
        input.to_pascal_case()
    }

    /// Uppercase the first letter of every whitespace- or underscore-separated word
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::title_case("created at"), "Created At");
    /// assert_eq!(TemplateHelpers::title_case("user_name"), "User Name");
    /// assert_eq!(TemplateHelpers::title_case(""), "");
    /// ```
    #[must_use]
    pub fn title_case(input: &str) -> String {
        input
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|word| !word.is_empty())
            .map(Self::upper_first)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Lowercase the first character, leaving the rest untouched
    ///
    /// Operates on the first code point, so multi-byte characters survive.
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::lower_first("UserName"), "userName");
    /// assert_eq!(TemplateHelpers::lower_first("Éclair"), "éclair");
    /// assert_eq!(TemplateHelpers::lower_first(""), "");
    /// ```
    #[must_use]
    pub fn lower_first(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_lowercase().chain(chars).collect()
        })
    }

    /// Uppercase the first character, leaving the rest untouched
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::upper_first("userName"), "UserName");
    /// assert_eq!(TemplateHelpers::upper_first("ñandu"), "Ñandu");
    /// ```
    #[must_use]
    pub fn upper_first(input: &str) -> String {
        let mut chars = input.chars();
        chars.next().map_or_else(String::new, |first| {
            first.to_uppercase().chain(chars).collect()
        })
    }

    /// Convert model name to the file stem used for backend artifacts
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_file_stem("Post"), "post");
    /// assert_eq!(TemplateHelpers::to_file_stem("blogPost"), "blogpost");
    /// ```
    #[must_use]
    pub fn to_file_stem(model: &str) -> String {
        model.to_lowercase()
    }

    /// Convert model name to table name (`snake_case`, singular)
    ///
    /// # Examples
    ///
    /// ```
    /// # use genpro::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_table_name("Post"), "post");
    /// assert_eq!(TemplateHelpers::to_table_name("UserProfile"), "user_profile");
    /// ```
    #[must_use]
    pub fn to_table_name(model: &str) -> String {
        Self::to_snake_case(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_snake_and_pascal() {
        assert_eq!(TemplateHelpers::to_snake_case("BlogPost"), "blog_post");
        assert_eq!(TemplateHelpers::to_pascal_case("blog_post"), "BlogPost");
        assert_eq!(TemplateHelpers::to_pascal_case("id"), "Id");
    }

    #[test]
    fn test_first_char_transforms_on_empty() {
        assert_eq!(TemplateHelpers::lower_first(""), "");
        assert_eq!(TemplateHelpers::upper_first(""), "");
        assert_eq!(TemplateHelpers::title_case(""), "");
    }

    #[test]
    fn test_first_char_transforms_multibyte() {
        assert_eq!(TemplateHelpers::upper_first("éa"), "Éa");
        assert_eq!(TemplateHelpers::lower_first("ÉA"), "éA");
        // No case mapping for CJK, the text must come back intact
        assert_eq!(TemplateHelpers::upper_first("名前"), "名前");
    }

    #[test]
    fn test_title_case_collapses_separators() {
        assert_eq!(TemplateHelpers::title_case("  post   title "), "Post Title");
        assert_eq!(TemplateHelpers::title_case("due_date"), "Due Date");
    }

    proptest! {
        #[test]
        fn upper_first_preserves_tail(s in "\\PC*") {
            let out = TemplateHelpers::upper_first(&s);
            let tail_in: String = s.chars().skip(1).collect();
            let first_len = s.chars().next().map_or(0, |c| c.to_uppercase().count());
            let tail_out: String = out.chars().skip(first_len).collect();
            prop_assert_eq!(tail_in, tail_out);
        }

        #[test]
        fn lower_first_is_valid_utf8_and_nonempty_iff_input(s in "\\PC*") {
            let out = TemplateHelpers::lower_first(&s);
            prop_assert_eq!(out.is_empty(), s.is_empty());
        }

        #[test]
        fn snake_case_is_idempotent(s in "[a-z][a-zA-Z]{0,16}") {
            let once = TemplateHelpers::to_snake_case(&s);
            prop_assert_eq!(TemplateHelpers::to_snake_case(&once), once.clone());
        }
    }
}
