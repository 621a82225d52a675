//! User records and role derivation.
//!
//! The backend sends `role_num` as a number, a float or a numeric string, and
//! older records omit it entirely. The rank used for endpoint selection is
//! resolved here and nowhere else.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Rank of a staff member.
pub const STAFF_RANK: i64 = 4;
/// Rank of a manager.
pub const MANAGER_RANK: i64 = 3;
/// Rank of a director.
pub const DIRECTOR_RANK: i64 = 2;

/// `role_num` exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleNum {
    Number(i64),
    Float(f64),
    Text(String),
    Other(Value),
}

impl RoleNum {
    /// The supplied rank, whatever its range. Zero, non-numeric text and
    /// non-scalar values count as absent.
    pub fn rank(&self) -> Option<i64> {
        let n = match self {
            RoleNum::Number(n) => *n,
            RoleNum::Float(f) => f.trunc() as i64,
            RoleNum::Text(s) => leading_integer(s)?,
            RoleNum::Other(_) => return None,
        };
        (n != 0).then_some(n)
    }
}

/// Integer prefix of `s` after leading whitespace: "4", "-1", "3 (manager)".
fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Text fields tolerate scalars of any JSON type; numbers and booleans are
/// kept as their JSON text.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// A user record as returned by login/register and cached in the session.
///
/// Every field is optional and any JSON object decodes: the client never
/// validates the shape of a record, that is the backend's job. Fields the
/// client does not know about are kept in `extra` so a record survives a
/// persist/load cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub division_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_num: Option<RoleNum>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Numeric role rank: `role_num` when supplied, else derived from `role_name`.
    pub fn role_rank(&self) -> Option<i64> {
        derive_role_rank(self.role_num.as_ref(), self.role_name.as_deref())
    }

    /// See [`label_is_manager`]. Checks both the role and the role-name label.
    pub fn is_manager(&self) -> bool {
        [self.role.as_deref(), self.role_name.as_deref()]
            .into_iter()
            .flatten()
            .any(label_is_manager)
    }
}

/// Rank for a role-name label. Case-insensitive, whole-label match.
pub fn rank_from_role_name(role_name: &str) -> Option<i64> {
    match role_name.to_lowercase().as_str() {
        "staff" => Some(STAFF_RANK),
        "manager" => Some(MANAGER_RANK),
        "director" => Some(DIRECTOR_RANK),
        _ => None,
    }
}

/// Resolve a rank from an explicit value, falling back to the role-name label.
pub fn derive_role_rank(role_num: Option<&RoleNum>, role_name: Option<&str>) -> Option<i64> {
    role_num
        .and_then(RoleNum::rank)
        .or_else(|| role_name.and_then(rank_from_role_name))
}

/// True iff `label` contains "manager", ignoring case.
///
/// Substring test: "Senior Manager" and "managerial" both match.
pub fn label_is_manager(label: &str) -> bool {
    label.to_lowercase().contains("manager")
}
