//! Data types, match relations, and routine selection (component C5).
//! Ported from `scanroutines.h`'s `scan_data_type_t`/`scan_match_type_t`
//! and `sm_get_scanroutine`/`sm_choose_scanroutine`.

pub mod routines;

use crate::error::ScanError;
use crate::value::{MatchFlags, UserValue, Value, FLAGS_ALL, FLAGS_FLOAT, FLAGS_I16, FLAGS_I32, FLAGS_I64, FLAGS_I8, FLAGS_INTEGER, FLAG_F32, FLAG_F64};
use routines::ScanOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    AnyNumber,
    AnyInteger,
    AnyFloat,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    ByteArray,
    String,
}

impl DataType {
    /// `possible_flags_for_scan_data_type`: which `Value`/`UserValue` flag
    /// bits a given data type ever tests.
    pub fn allowed_flags(self) -> MatchFlags {
        match self {
            DataType::AnyNumber => FLAGS_ALL,
            DataType::AnyInteger => FLAGS_INTEGER,
            DataType::AnyFloat => FLAGS_FLOAT,
            DataType::Int8 => FLAGS_I8,
            DataType::Int16 => FLAGS_I16,
            DataType::Int32 => FLAGS_I32,
            DataType::Int64 => FLAGS_I64,
            DataType::Float32 => FLAG_F32,
            DataType::Float64 => FLAG_F64,
            DataType::ByteArray | DataType::String => 0,
        }
    }

    pub fn is_variable_length(self) -> bool {
        matches!(self, DataType::ByteArray | DataType::String)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchRelation {
    Any,
    Update,
    EqualTo,
    NotEqualTo,
    GreaterThan,
    LessThan,
    Range,
    Changed,
    NotChanged,
    Increased,
    Decreased,
    IncreasedBy,
    DecreasedBy,
}

impl MatchRelation {
    /// Whether this relation needs a user-supplied value at all (as
    /// opposed to comparing only against the stored old value, or nothing).
    pub fn consumes_user_value(self) -> bool {
        matches!(
            self,
            MatchRelation::EqualTo
                | MatchRelation::NotEqualTo
                | MatchRelation::GreaterThan
                | MatchRelation::LessThan
                | MatchRelation::Range
                | MatchRelation::IncreasedBy
                | MatchRelation::DecreasedBy
        )
    }
}

/// `sm_choose_scanroutine`: reject trivially-unmatchable (data type, match
/// relation, user value) combinations before ever attaching to a target.
pub fn validate_combination(
    data_type: DataType,
    relation: MatchRelation,
    user: Option<&[UserValue]>,
) -> Result<(), ScanError> {
    if data_type.is_variable_length() {
        return Ok(());
    }
    if relation.consumes_user_value() {
        let uflags = user.and_then(|u| u.first()).map(|u| u.flags).unwrap_or(0);
        if uflags & data_type.allowed_flags() == 0 {
            return Err(ScanError::UnsupportedCombination);
        }
    }
    Ok(())
}

/// `sm_get_scanroutine`, applied: run the routine selected by
/// `(data_type, relation)` against one window of target memory. `memory`
/// must be at least as long as the widest interpretation `data_type`
/// allows (8 bytes for any numeric type; the user pattern length for
/// bytearray/string).
pub fn scan_match(
    data_type: DataType,
    relation: MatchRelation,
    memory: &[u8],
    old: &Value,
    user: &[UserValue],
    reverse_endianness: bool,
) -> ScanOutcome {
    match data_type {
        DataType::ByteArray => match relation {
            MatchRelation::Any | MatchRelation::Update => routines::vlt_any_or_update(memory, old),
            _ => user.first().map(|u| routines::bytearray_equalto(memory, u)).unwrap_or_default(),
        },
        DataType::String => match relation {
            MatchRelation::Any | MatchRelation::Update => routines::vlt_any_or_update(memory, old),
            _ => user.first().map(|u| routines::string_equalto(memory, u)).unwrap_or_default(),
        },
        _ => routines::scan_numeric(memory, old, user, relation, reverse_endianness, data_type.allowed_flags()),
    }
}
