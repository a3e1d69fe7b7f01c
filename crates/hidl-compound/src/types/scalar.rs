// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 hidl-gen contributors

//! Scalar field kinds and their per-backend spellings.

use std::fmt;

/// Fixed-width scalar types understood by every backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalarKind {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
}

impl ScalarKind {
    /// Parse the IDL keyword for a scalar (`int32`, `bool`, ...).
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "bool" => Self::Bool,
            "int8" => Self::Int8,
            "uint8" => Self::Uint8,
            "int16" => Self::Int16,
            "uint16" => Self::Uint16,
            "int32" => Self::Int32,
            "uint32" => Self::Uint32,
            "int64" => Self::Int64,
            "uint64" => Self::Uint64,
            "float" => Self::Float,
            "double" => Self::Double,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Width in bytes. Scalars are naturally aligned, so this is also the alignment.
    pub const fn width(self) -> usize {
        match self {
            Self::Bool | Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float => 4,
            Self::Int64 | Self::Uint64 | Self::Double => 8,
        }
    }

    /// C++ spelling used by the native backend.
    pub const fn native_name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8_t",
            Self::Uint8 => "uint8_t",
            Self::Int16 => "int16_t",
            Self::Uint16 => "uint16_t",
            Self::Int32 => "int32_t",
            Self::Uint32 => "uint32_t",
            Self::Int64 => "int64_t",
            Self::Uint64 => "uint64_t",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Suffix of the parcel accessor (`readInt32`, `writeUint8`, ...).
    pub const fn parcel_suffix(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Uint8 => "Uint8",
            Self::Int16 => "Int16",
            Self::Uint16 => "Uint16",
            Self::Int32 => "Int32",
            Self::Uint32 => "Uint32",
            Self::Int64 => "Int64",
            Self::Uint64 => "Uint64",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    /// Java primitive spelling. Java has no unsigned types.
    pub const fn managed_name(self) -> &'static str {
        match self {
            Self::Bool => "boolean",
            Self::Int8 | Self::Uint8 => "byte",
            Self::Int16 | Self::Uint16 => "short",
            Self::Int32 | Self::Uint32 => "int",
            Self::Int64 | Self::Uint64 => "long",
            Self::Float => "float",
            Self::Double => "double",
        }
    }

    /// Java boxed spelling, used for collection element types.
    pub const fn managed_boxed_name(self) -> &'static str {
        match self {
            Self::Bool => "Boolean",
            Self::Int8 | Self::Uint8 => "Byte",
            Self::Int16 | Self::Uint16 => "Short",
            Self::Int32 | Self::Uint32 => "Integer",
            Self::Int64 | Self::Uint64 => "Long",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    /// Suffix of the `HwBlob`/`HwParcel` accessor (`getInt32`, `putInt8`, ...).
    pub const fn managed_suffix(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 | Self::Uint8 => "Int8",
            Self::Int16 | Self::Uint16 => "Int16",
            Self::Int32 | Self::Uint32 => "Int32",
            Self::Int64 | Self::Uint64 => "Int64",
            Self::Float => "Float",
            Self::Double => "Double",
        }
    }

    /// Zero literal for Java field initialisers.
    pub const fn managed_default(self) -> &'static str {
        match self {
            Self::Bool => "false",
            Self::Float => "0.0f",
            Self::Double => "0.0d",
            Self::Int64 | Self::Uint64 => "0L",
            _ => "0",
        }
    }

    /// Scalar name in the conformance-test descriptor format.
    pub const fn descriptor_name(self) -> &'static str {
        match self {
            Self::Bool => "bool_t",
            Self::Float => "float_t",
            Self::Double => "double_t",
            other => other.native_name(),
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
