//! OBJECT RESOLVER
//!
//! Infers the physical object (and whether it belongs to a named complex)
//! from a task's "Traject of Complex" category and its description. There is
//! no stable identifier linking a task to an object, so this is an ordered
//! cascade of string rules over known vocabulary. First match wins.
//!
//! **Standard cascade**:
//!   1. `complex`          category names a complex → text after "complex"
//!   2. `verkeerscentrale` traffic centres are out of scope, except Waalbrug
//!   3. `eilandbrug`       a complex that never uses the word "complex"
//!   4. `description`      object is the second "-"-delimited field of the
//!                         description, cut at the first "/"
//!
//! Rule 4 always applies and fails loudly when the description does not
//! follow the "<code> - <object>" naming convention.

use crate::error::{ConversionError, ConversionResult};

/// Outcome of resolving a single task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved { object: String, is_complex: bool },
    /// Task is out of OHJP scope and dropped from all later stages
    Excluded,
}

impl Resolution {
    fn fixed(object: impl Into<String>) -> Self {
        Resolution::Resolved {
            object: object.into(),
            is_complex: false,
        }
    }

    fn complex(object: impl Into<String>) -> Self {
        Resolution::Resolved {
            object: object.into(),
            is_complex: true,
        }
    }
}

type Predicate = Box<dyn Fn(&str, &str) -> bool + Send + Sync>;
type Resolver = Box<dyn Fn(&str, &str) -> Option<Resolution> + Send + Sync>;

/// One `(predicate, resolver)` pair of the cascade
///
/// Both closures receive `(category, description)`. A resolver returning
/// `None` means the rule matched but could not find any object text.
pub struct ObjectRule {
    name: &'static str,
    applies: Predicate,
    resolve: Resolver,
}

impl ObjectRule {
    pub fn new(
        name: &'static str,
        applies: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
        resolve: impl Fn(&str, &str) -> Option<Resolution> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            applies: Box::new(applies),
            resolve: Box::new(resolve),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl std::fmt::Debug for ObjectRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectRule").field("name", &self.name).finish()
    }
}

/// Ordered rule cascade
#[derive(Debug)]
pub struct ObjectResolver {
    rules: Vec<ObjectRule>,
}

impl Default for ObjectResolver {
    fn default() -> Self {
        Self::standard()
    }
}

impl ObjectResolver {
    /// The four-rule cascade used for VITAAL exports
    pub fn standard() -> Self {
        Self {
            rules: vec![
                ObjectRule::new(
                    "complex",
                    |category, _| contains_ignore_case(category, "complex"),
                    |category, _| text_after_ignore_case(category, "complex").map(Resolution::complex),
                ),
                ObjectRule::new(
                    "verkeerscentrale",
                    |category, _| contains_ignore_case(category, "verkeerscentrale"),
                    |_, description| {
                        // Waalbrug is classified under a traffic centre but is in scope
                        if contains_ignore_case(description, "waalbrug") {
                            Some(Resolution::fixed("Waalbrug"))
                        } else {
                            Some(Resolution::Excluded)
                        }
                    },
                ),
                ObjectRule::new(
                    "eilandbrug",
                    |category, _| contains_ignore_case(category, "eilandbrug"),
                    |_, _| Some(Resolution::complex("Eilandbrug")),
                ),
                ObjectRule::new("description", |_, _| true, |_, description| {
                    object_from_description(description).map(Resolution::fixed)
                }),
            ],
        }
    }

    /// Insert an extra rule at `position` (0 = highest precedence)
    ///
    /// Positions past the end append the rule after the fallback, where it
    /// can never fire.
    pub fn insert_rule(&mut self, position: usize, rule: ObjectRule) {
        let position = position.min(self.rules.len());
        self.rules.insert(position, rule);
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(ObjectRule::name).collect()
    }

    /// Resolve one task. `None` if the matching rule found no object text.
    pub fn resolve(&self, category: &str, description: &str) -> Option<Resolution> {
        self.rules
            .iter()
            .find(|rule| (rule.applies)(category, description))
            .and_then(|rule| (rule.resolve)(category, description))
    }

    /// Resolve parallel category/description sequences, preserving order
    ///
    /// Stops at the first row without a usable object.
    pub fn resolve_all<C, D>(&self, categories: &[C], descriptions: &[D]) -> ConversionResult<Vec<Resolution>>
    where
        C: AsRef<str>,
        D: AsRef<str>,
    {
        debug_assert_eq!(categories.len(), descriptions.len());

        categories
            .iter()
            .zip(descriptions)
            .enumerate()
            .map(|(row, (category, description))| {
                let description = description.as_ref();
                self.resolve(category.as_ref(), description)
                    .ok_or_else(|| ConversionError::Resolution {
                        row,
                        description: description.to_string(),
                    })
            })
            .collect()
    }
}

/// Second "-"-delimited field of the description, cut at the first "/"
///
/// "BRG - Waalbrug/Noord" → "Waalbrug"
pub fn object_from_description(description: &str) -> Option<String> {
    let (_, after_dash) = description.split_once('-')?;
    // Only the second "-" field counts, as in "<code> - <object> - <activity>"
    let field = after_dash.split('-').next().unwrap_or(after_dash);
    let object = match field.split_once('/') {
        Some((before_slash, _)) => before_slash,
        None => field,
    }
    .trim();

    if object.is_empty() {
        None
    } else {
        Some(object.to_string())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    find_ignore_case(haystack, needle).is_some()
}

/// Trimmed text following the first case-insensitive occurrence of `needle`
fn text_after_ignore_case(haystack: &str, needle: &str) -> Option<String> {
    find_ignore_case(haystack, needle).map(|idx| haystack[idx + needle.len()..].trim().to_string())
}

/// Byte offset of `needle` (ASCII) in `haystack`, ignoring ASCII case
fn find_ignore_case(haystack: &str, needle: &str) -> Option<usize> {
    // ASCII folding keeps byte offsets aligned with the original string
    haystack.to_ascii_lowercase().find(&needle.to_ascii_lowercase())
}
