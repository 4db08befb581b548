//! `Fn::Sub` template parsing
//!
//! A substitution template is scanned once, left to right, into literal text and `${...}`
//! placeholders.
//!
//! - `${Name}` is a placeholder for `Name`
//! - `${!Name}` is an escape and produces the literal text `${Name}`
//! - a `${` without a closing `}` is literal text
//!
//! ```
//! use cfn_eval::sub::{parse, Segment};
//!
//! assert_eq!(parse("arn:${AWS::Partition}:s3:::${Bucket}/*"), vec![
//!     Segment::Literal("arn:".to_string()),
//!     Segment::Placeholder("AWS::Partition".to_string()),
//!     Segment::Literal(":s3:::".to_string()),
//!     Segment::Placeholder("Bucket".to_string()),
//!     Segment::Literal("/*".to_string()),
//! ]);
//! ```

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Placeholder(String),
}

pub fn parse(template: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find('}') else {
            break;
        };

        literal.push_str(&rest[..start]);
        let token = &after_open[..end];

        if let Some(escaped) = token.strip_prefix('!') {
            literal.push_str("${");
            literal.push_str(escaped);
            literal.push('}');
        } else {
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Placeholder(token.to_string()));
        }

        rest = &after_open[end + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }

    segments
}

/// How a placeholder that is not an explicit variable resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference<'a> {
    /// `${Name}`
    Ref(&'a str),
    /// `${Resource.Attribute}`, the attribute may contain further dots
    GetAtt(&'a str, &'a str),
}

impl<'a> Reference<'a> {
    pub fn from_placeholder(placeholder: &'a str) -> Self {
        match placeholder.split_once('.') {
            Some((logical_id, attribute)) => Reference::GetAtt(logical_id, attribute),
            None => Reference::Ref(placeholder),
        }
    }
}
