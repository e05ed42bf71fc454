//! ABI descriptors.
//!
//! A [`Signature`] is the classifier input: representation types of the
//! parameters and the result. A [`FunctionAbi`] is its output, consumed
//! verbatim by code generation when declaring, defining and calling a
//! procedure.

use tern_types::CallingConvention;

use crate::ReprType;

/// Calling attribute carried by a classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgAttr {
    /// `zeroext`: booleans widened by the caller.
    ZeroExt,
    /// `byval`: callee receives its own copy behind the pointer.
    ByVal,
    /// `sret`: caller-provided return slot.
    StructRet,
}

/// How one value crosses the call boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgClass {
    /// In registers, optionally reinterpreted as a same-size `cast` type.
    Direct {
        ty: ReprType,
        cast: Option<ReprType>,
        attr: Option<ArgAttr>,
    },
    /// Through a hidden pointer to `ty`.
    Indirect {
        ty: ReprType,
        attr: Option<ArgAttr>,
        /// Explicit pointee alignment for `byval` copies.
        align: Option<i64>,
    },
    /// Zero-sized; occupies no physical slot.
    Ignore { ty: ReprType },
}

impl ArgClass {
    /// `Direct` with no cast or attribute.
    pub fn direct(ty: ReprType) -> Self {
        ArgClass::Direct {
            ty,
            cast: None,
            attr: None,
        }
    }

    pub fn direct_cast(ty: ReprType, cast: ReprType) -> Self {
        ArgClass::Direct {
            ty,
            cast: Some(cast),
            attr: None,
        }
    }

    /// `Direct`, zero-extended when `ty` is `i1`.
    pub fn scalar(ty: ReprType) -> Self {
        let attr = (ty == ReprType::I1).then_some(ArgAttr::ZeroExt);
        ArgClass::Direct {
            ty,
            cast: None,
            attr,
        }
    }

    pub fn indirect(ty: ReprType, attr: Option<ArgAttr>) -> Self {
        ArgClass::Indirect {
            ty,
            attr,
            align: None,
        }
    }

    /// `sret` return slot.
    pub fn struct_ret(ty: ReprType) -> Self {
        Self::indirect(ty, Some(ArgAttr::StructRet))
    }

    /// `byval` copy aligned to at least 8 bytes.
    pub fn byval(ty: ReprType, align: i64) -> Self {
        ArgClass::Indirect {
            ty,
            attr: Some(ArgAttr::ByVal),
            align: Some(align.max(8)),
        }
    }

    pub fn ignore(ty: ReprType) -> Self {
        ArgClass::Ignore { ty }
    }

    /// The representation type being passed.
    pub fn ty(&self) -> &ReprType {
        match self {
            ArgClass::Direct { ty, .. } | ArgClass::Indirect { ty, .. } | ArgClass::Ignore { ty } => {
                ty
            }
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, ArgClass::Direct { .. })
    }

    pub fn is_indirect(&self) -> bool {
        matches!(self, ArgClass::Indirect { .. })
    }

    pub fn is_ignore(&self) -> bool {
        matches!(self, ArgClass::Ignore { .. })
    }

    /// The cast type of a `Direct` classification.
    pub fn cast(&self) -> Option<&ReprType> {
        match self {
            ArgClass::Direct { cast, .. } => cast.as_ref(),
            _ => None,
        }
    }

    pub fn attr(&self) -> Option<ArgAttr> {
        match self {
            ArgClass::Direct { attr, .. } | ArgClass::Indirect { attr, .. } => *attr,
            ArgClass::Ignore { .. } => None,
        }
    }
}

/// A multi-value result returned partly through out-pointers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct SplitReturn {
    /// The combined result struct before splitting.
    pub original: ReprType,
    /// Parameter count before the out-pointers were appended.
    pub original_param_count: usize,
}

/// Physical ABI for a procedure.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct FunctionAbi {
    /// Declared parameters, then split-return out-pointers, then the
    /// implicit context pointer.
    pub params: Vec<ArgClass>,
    /// `Direct` of `void` when there is no result.
    pub ret: ArgClass,
    pub call_conv: CallingConvention,
    pub split_return: Option<SplitReturn>,
}

/// One parameter's representation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ArgRepr {
    pub ty: ReprType,
    /// Lowered from a string or slice: padding fields may be dropped.
    pub slice_like: bool,
}

impl From<ReprType> for ArgRepr {
    fn from(ty: ReprType) -> Self {
        ArgRepr {
            ty,
            slice_like: false,
        }
    }
}

/// Classifier input for one procedure type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub params: Vec<ArgRepr>,
    /// `None` when the procedure returns nothing.
    pub ret: Option<ReprType>,
    /// The result combines several values into one struct.
    pub ret_is_tuple: bool,
    pub call_conv: CallingConvention,
}

impl Signature {
    pub fn new(call_conv: CallingConvention, params: Vec<ArgRepr>, ret: Option<ReprType>) -> Self {
        Signature {
            params,
            ret,
            ret_is_tuple: false,
            call_conv,
        }
    }

    /// Mark the result as a combined multi-value struct (builder pattern).
    #[must_use]
    pub fn with_tuple_return(mut self) -> Self {
        self.ret_is_tuple = true;
        self
    }
}
