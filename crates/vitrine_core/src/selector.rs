//! CSS-style selectors
//!
//! Supports the subset the page engines need:
//!
//! - type selectors (`section`, `a`) and the universal selector `*`
//! - `#id` and `.class`
//! - attribute presence `[data-tilt]`, equality `[href="#about"]` and
//!   prefix match `[href^="#"]`
//! - descendant (whitespace) and child (`>`) combinators
//! - selector lists separated by commas
//!
//! This parser uses nom's `VerboseError` so parse failures carry context.

use crate::error::{CoreError, Result};
use crate::page::Node;
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt},
    error::{convert_error, ErrorKind, ParseError as NomParseError, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, preceded, tuple},
    Finish, IResult,
};

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// How an attribute value is compared
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttributeMatch {
    /// `[name]`
    Present,
    /// `[name="value"]`
    Equals(String),
    /// `[name^="value"]`
    Prefix(String),
}

/// A single part of a compound selector
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorPart {
    /// #id selector
    Id(String),
    /// .class selector
    Class(String),
    /// [attr] selector
    Attribute { name: String, op: AttributeMatch },
}

/// Combinator between compound selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (space): `.parent .child`
    Descendant,
    /// Child combinator (>): `.parent > .child`
    Child,
}

/// A compound selector is an optional type plus simple selectors with no
/// combinator, e.g. `a.btn[data-tilt]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompoundSelector {
    /// Lowercased tag name; `None` matches any tag
    pub tag: Option<String>,
    pub parts: Vec<SelectorPart>,
}

impl CompoundSelector {
    /// Test a single node against this compound (no ancestry)
    pub fn matches(&self, node: &Node) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.parts.iter().all(|part| match part {
            SelectorPart::Id(id) => node.attribute("id") == Some(id.as_str()),
            SelectorPart::Class(class) => node.has_class(class),
            SelectorPart::Attribute { name, op } => match (node.attribute(name), op) {
                (None, _) => false,
                (Some(_), AttributeMatch::Present) => true,
                (Some(value), AttributeMatch::Equals(expected)) => value == expected,
                (Some(value), AttributeMatch::Prefix(prefix)) => {
                    !prefix.is_empty() && value.starts_with(prefix.as_str())
                }
            },
        })
    }
}

/// A complex selector is a chain of compound selectors joined by combinators.
///
/// Each segment stores the combinator that joins it to the *next* segment;
/// the last segment always has `None` (it is the target element).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexSelector {
    pub segments: Vec<(CompoundSelector, Option<Combinator>)>,
}

impl ComplexSelector {
    /// Get the rightmost (target) compound selector
    pub fn target(&self) -> Option<&CompoundSelector> {
        self.segments.last().map(|(compound, _)| compound)
    }

    /// Returns true if this is a simple selector (single compound, no combinators)
    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

/// A comma separated selector list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse selector text
    pub fn parse(input: &str) -> Result<Self> {
        match all_consuming(delimited(multispace0, selector_list, multispace0))(input).finish() {
            Ok((_, selectors)) => Ok(SelectorList { selectors }),
            Err(err) => Err(CoreError::Selector {
                selector: input.to_string(),
                message: convert_error(input, err),
            }),
        }
    }
}

impl std::str::FromStr for SelectorList {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse an identifier (alphanumeric, hyphen, underscore)
fn identifier<'a, E: NomParseError<&'a str>>(input: &'a str) -> IResult<&'a str, &'a str, E> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_')(input)
}

/// Attribute value: quoted with either quote style, or a bare token
fn attribute_value(input: &str) -> ParseResult<&str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        take_while1(|c: char| c != ']' && !c.is_whitespace()),
    ))(input)
}

/// Parse `[name]`, `[name=value]` or `[name^=value]`
fn attribute_selector(input: &str) -> ParseResult<SelectorPart> {
    let comparison = tuple((alt((tag("^="), tag("="))), multispace0, attribute_value));
    map(
        delimited(
            tuple((char('['), multispace0)),
            tuple((identifier, multispace0, opt(comparison), multispace0)),
            char(']'),
        ),
        |(name, _, comparison, _): (&str, &str, Option<(&str, &str, &str)>, &str)| {
            let op = match comparison {
                None => AttributeMatch::Present,
                Some(("^=", _, value)) => AttributeMatch::Prefix(value.to_string()),
                Some((_, _, value)) => AttributeMatch::Equals(value.to_string()),
            };
            SelectorPart::Attribute {
                name: name.to_ascii_lowercase(),
                op,
            }
        },
    )(input)
}

fn simple_part(input: &str) -> ParseResult<SelectorPart> {
    alt((
        map(preceded(char('#'), identifier), |id: &str| {
            SelectorPart::Id(id.to_string())
        }),
        map(preceded(char('.'), identifier), |class: &str| {
            SelectorPart::Class(class.to_string())
        }),
        attribute_selector,
    ))(input)
}

/// Parse a type selector; `*` yields `None`
fn type_selector(input: &str) -> ParseResult<Option<String>> {
    alt((
        map(char('*'), |_| None),
        map(identifier, |name: &str| Some(name.to_ascii_lowercase())),
    ))(input)
}

/// Parse a compound selector: an optional type followed by simple parts.
/// e.g. `a.btn[data-tilt]`
fn compound_selector(input: &str) -> ParseResult<CompoundSelector> {
    let (rest, ty) = opt(type_selector)(input)?;
    let (rest, parts) = many0(simple_part)(rest)?;

    if ty.is_none() && parts.is_empty() {
        return Err(nom::Err::Error(VerboseError::from_error_kind(
            input,
            ErrorKind::Many1,
        )));
    }

    Ok((
        rest,
        CompoundSelector {
            tag: ty.flatten(),
            parts,
        },
    ))
}

fn combinator(input: &str) -> ParseResult<Combinator> {
    alt((
        map(delimited(multispace0, char('>'), multispace0), |_| {
            Combinator::Child
        }),
        map(multispace1, |_| Combinator::Descendant),
    ))(input)
}

/// Parse a complex selector: compounds joined by combinators
fn complex_selector(input: &str) -> ParseResult<ComplexSelector> {
    let (mut remaining, first) = compound_selector(input)?;
    let mut segments = vec![(first, None)];

    loop {
        match tuple((combinator, compound_selector))(remaining) {
            Ok((rest, (comb, next))) => {
                if let Some(last) = segments.last_mut() {
                    last.1 = Some(comb);
                }
                segments.push((next, None));
                remaining = rest;
            }
            // Trailing whitespace or a list separator ends the selector
            Err(nom::Err::Error(_)) => break,
            Err(err) => return Err(err),
        }
    }

    Ok((remaining, ComplexSelector { segments }))
}

fn selector_list(input: &str) -> ParseResult<Vec<ComplexSelector>> {
    separated_list1(
        delimited(multispace0, char(','), multispace0),
        complex_selector,
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class(name: &str) -> SelectorPart {
        SelectorPart::Class(name.to_string())
    }

    #[test]
    fn parses_class_list() {
        let list = SelectorList::parse(".skills-grid, .projects-grid").unwrap();
        assert_eq!(list.selectors.len(), 2);
        assert!(list.selectors.iter().all(|s| s.is_simple()));
        assert_eq!(
            list.selectors[1].target().unwrap().parts,
            vec![class("projects-grid")]
        );
    }

    #[test]
    fn parses_descendant_chain() {
        let list = SelectorList::parse(".section-header h2").unwrap();
        let complex = &list.selectors[0];
        assert_eq!(complex.segments.len(), 2);
        assert_eq!(complex.segments[0].1, Some(Combinator::Descendant));
        assert_eq!(complex.segments[1].0.tag.as_deref(), Some("h2"));
        assert_eq!(complex.segments[1].1, None);
    }

    #[test]
    fn parses_child_combinator() {
        let list = SelectorList::parse(".nav-links > a").unwrap();
        assert_eq!(list.selectors[0].segments[0].1, Some(Combinator::Child));
    }

    #[test]
    fn parses_attribute_forms() {
        let list = SelectorList::parse("a[href^=\"#\"], [data-tilt], [id='about']").unwrap();
        let parts: Vec<_> = list
            .selectors
            .iter()
            .map(|s| s.target().unwrap().parts[0].clone())
            .collect();
        assert_eq!(
            parts,
            vec![
                SelectorPart::Attribute {
                    name: "href".into(),
                    op: AttributeMatch::Prefix("#".into())
                },
                SelectorPart::Attribute {
                    name: "data-tilt".into(),
                    op: AttributeMatch::Present
                },
                SelectorPart::Attribute {
                    name: "id".into(),
                    op: AttributeMatch::Equals("about".into())
                },
            ]
        );
        assert_eq!(list.selectors[0].target().unwrap().tag.as_deref(), Some("a"));
    }

    #[test]
    fn attribute_brackets_allow_padding() {
        let list = SelectorList::parse("[ data-width = \"80\" ], [ data-tilt ]").unwrap();
        assert_eq!(
            list.selectors[0].target().unwrap().parts,
            vec![SelectorPart::Attribute {
                name: "data-width".into(),
                op: AttributeMatch::Equals("80".into())
            }]
        );
        assert_eq!(
            list.selectors[1].target().unwrap().parts,
            vec![SelectorPart::Attribute {
                name: "data-tilt".into(),
                op: AttributeMatch::Present
            }]
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let list = SelectorList::parse("  a , button  ").unwrap();
        assert_eq!(list.selectors.len(), 2);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse(".").is_err());
        assert!(SelectorList::parse("a,,b").is_err());
        let err = SelectorList::parse("[unclosed").unwrap_err();
        assert!(matches!(err, CoreError::Selector { .. }));
    }
}
