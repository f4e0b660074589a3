//! Write hooks: sanitize, then validate.
//!
//! Every persisted entity (and every partial-update payload) implements
//! [`Constrained`], which exposes a static table of [`Field`]s. Each field
//! carries an ordered list of sanitizers and an ordered list of validation
//! rules. The store calls [`before_insert`] or [`before_update`] on its write
//! path; a non-empty violation list aborts the write.
//!
//! Inserts validate every declared field. Updates validate only the fields
//! present in the payload, so partial patches never fail for absent fields.

use std::{fmt, net::IpAddr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Declarations ────────────────────────────────────────────────────────────

/// Normalisation applied to a string field before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
  /// Strip leading and trailing whitespace.
  Trim,
}

/// A constraint a field value must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
  /// The value must be present and not the empty string.
  NotEmpty,
  /// The value must be an absolute URL whose scheme is one of `protocols`
  /// and whose host is a fully-qualified domain or an IP address.
  Url { protocols: &'static [&'static str] },
  /// The value must look like an email address.
  Email,
}

/// URL rule accepting plain web links only.
pub const WEB_URL: Rule = Rule::Url { protocols: &["https", "http"] };

/// One column-level entry in an entity's constraint table.
#[derive(Debug, Clone, Copy)]
pub struct Field {
  pub name:       &'static str,
  pub sanitizers: &'static [Sanitizer],
  pub rules:      &'static [Rule],
}

/// The state of a field as seen by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
  /// Not supplied at all (only partial-update payloads produce this).
  Missing,
  /// Supplied as an explicit null on a nullable column. Rules are skipped.
  Null,
  Text(&'a str),
}

/// Which write is being guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Insert,
  /// Missing fields are skipped rather than rejected.
  Update,
}

/// Implemented by every entity and payload that flows through the store's
/// write path.
pub trait Constrained {
  /// Declared sanitizers and rules, in evaluation order.
  const FIELDS: &'static [Field];

  fn field(&self, name: &str) -> FieldValue<'_>;

  /// Mutable access to a string field for sanitisation. `None` when the
  /// field is missing or null.
  fn field_mut(&mut self, name: &str) -> Option<&mut String>;
}

// ─── Violations ──────────────────────────────────────────────────────────────

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
  pub property:   String,
  /// Machine-readable rule name, e.g. `"isNotEmpty"`.
  pub constraint: String,
  pub message:    String,
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message)
  }
}

/// Every violation collected while validating one object.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("validation failed: {}", join(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
  pub fn violations(&self) -> &[Violation] { &self.0 }

  /// True if some violation concerns `property`.
  pub fn has(&self, property: &str) -> bool {
    self.0.iter().any(|v| v.property == property)
  }
}

fn join(violations: &[Violation]) -> String {
  violations
    .iter()
    .map(Violation::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

// ─── Hooks ───────────────────────────────────────────────────────────────────

/// Run before every insert: sanitize, then validate all fields.
pub fn before_insert<T: Constrained>(entity: &mut T) -> Result<(), ValidationErrors> {
  sanitize(entity);
  validate(entity, Mode::Insert)
}

/// Run before every update: sanitize, then validate present fields only.
pub fn before_update<T: Constrained>(entity: &mut T) -> Result<(), ValidationErrors> {
  sanitize(entity);
  validate(entity, Mode::Update)
}

/// Apply every declared sanitizer in place.
pub fn sanitize<T: Constrained>(entity: &mut T) {
  for field in T::FIELDS {
    for sanitizer in field.sanitizers {
      if let Some(value) = entity.field_mut(field.name) {
        sanitizer.apply(value);
      }
    }
  }
}

/// Evaluate every rule and collect the failures.
pub fn validate<T: Constrained>(entity: &T, mode: Mode) -> Result<(), ValidationErrors> {
  let mut violations = Vec::new();

  for field in T::FIELDS {
    let value = entity.field(field.name);
    match (value, mode) {
      (FieldValue::Null, _) | (FieldValue::Missing, Mode::Update) => continue,
      _ => {}
    }
    for rule in field.rules {
      if !rule.check(value) {
        violations.push(Violation {
          property:   field.name.to_owned(),
          constraint: rule.name().to_owned(),
          message:    rule.message(field.name),
        });
      }
    }
  }

  if violations.is_empty() {
    Ok(())
  } else {
    Err(ValidationErrors(violations))
  }
}

// ─── Rule evaluation ─────────────────────────────────────────────────────────

impl Sanitizer {
  fn apply(self, value: &mut String) {
    match self {
      Self::Trim => {
        let trimmed = value.trim();
        if trimmed.len() != value.len() {
          *value = trimmed.to_owned();
        }
      }
    }
  }
}

impl Rule {
  pub fn name(&self) -> &'static str {
    match self {
      Self::NotEmpty => "isNotEmpty",
      Self::Url { .. } => "isUrl",
      Self::Email => "isEmail",
    }
  }

  fn message(&self, property: &str) -> String {
    match self {
      Self::NotEmpty => format!("{property} should not be empty"),
      Self::Url { protocols } => {
        format!("{property} must be a URL address ({})", protocols.join(", "))
      }
      Self::Email => format!("{property} must be an email"),
    }
  }

  fn check(&self, value: FieldValue<'_>) -> bool {
    let FieldValue::Text(text) = value else {
      return matches!(value, FieldValue::Null);
    };
    match self {
      Self::NotEmpty => !text.is_empty(),
      Self::Url { protocols } => is_url(text, protocols),
      Self::Email => is_email(text),
    }
  }
}

/// Longest URL most browsers accept, exclusive.
const MAX_URL_LEN: usize = 2083;

fn is_url(text: &str, protocols: &[&str]) -> bool {
  if text.is_empty()
    || text.len() >= MAX_URL_LEN
    || text.chars().any(|c| c.is_whitespace() || c == '<' || c == '>')
  {
    return false;
  }
  // `Url::parse` accepts scheme-relative oddities like `http:example.com`
  // and collapses `https:///host` into `https://host`.
  let Some((scheme, rest)) = text.split_once("://") else {
    return false;
  };
  if !protocols.iter().any(|p| p.eq_ignore_ascii_case(scheme))
    || rest.is_empty()
    || rest.starts_with('/')
  {
    return false;
  }
  let Ok(url) = url::Url::parse(text) else {
    return false;
  };
  match url.host() {
    Some(url::Host::Domain(domain)) => has_tld(domain),
    Some(url::Host::Ipv4(_) | url::Host::Ipv6(_)) => true,
    None => false,
  }
}

fn has_tld(domain: &str) -> bool {
  let domain = domain.trim_end_matches('.');
  let Some((labels, tld)) = domain.rsplit_once('.') else {
    return false;
  };
  !labels.is_empty()
    && labels.split('.').all(is_label)
    && tld.len() >= 2
    && (tld.chars().all(|c| c.is_alphabetic()) || tld.starts_with("xn--"))
}

/// A hostname label: letters, digits and inner hyphens, at most 63 bytes.
fn is_label(label: &str) -> bool {
  !label.is_empty()
    && label.len() <= 63
    && !label.starts_with('-')
    && !label.ends_with('-')
    && label.chars().all(|c| c.is_alphanumeric() || c == '-')
}

fn is_email(text: &str) -> bool {
  if text.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = text.rsplit_once('@') else {
    return false;
  };
  !local.is_empty()
    && !local.contains('@')
    && (has_tld(domain) || domain.parse::<IpAddr>().is_ok())
}
