//! The closed set of part kinds and the classification of vendor part
//! names into that set.
//!
//! Every consumer matches exhaustively on [`PartKind`], so adding a kind
//! forces each resolver and extractor case to be revisited.
use std::collections::BTreeMap;

use phf::{phf_map, phf_set};

/// Comparison performed by a comparator box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Gt => ">",
            CompareOp::Lt => "<",
            CompareOp::Ge => ">=",
            CompareOp::Le => "<=",
        }
    }
}

/// Binary operation performed by an arithmetic or word-logic box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Xor,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "MOD",
            ArithmeticOp::Xor => "XOR",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgePolarity {
    Positive,
    Negative,
}

impl EdgePolarity {
    /// Name of the marker function used when no instance backs the edge.
    pub fn marker(&self) -> &'static str {
        match self {
            EdgePolarity::Positive => "PosEdge",
            EdgePolarity::Negative => "NegEdge",
        }
    }
}

/// Edge detectors come as a contact (`-|P|-`, operand pin) or as a box
/// (`P_TRIG`-like, `in` and `bit` pins).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeForm {
    Contact,
    Box,
}

/// Which input wins when set and reset are both active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dominance {
    Set,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LatchVariant {
    /// Set/reset flip-flop; reset is evaluated last and dominates.
    Sr,
    /// Reset/set flip-flop; set is evaluated last and dominates.
    Rs,
}

impl LatchVariant {
    pub fn dominance(&self) -> Dominance {
        match self {
            LatchVariant::Sr => Dominance::Reset,
            LatchVariant::Rs => Dominance::Set,
        }
    }
}

/// The kind of a part.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartKind {
    Contact,
    NegatedContact,
    Coil,
    SetCoil,
    ResetCoil,
    /// Parallel branch (`O`) or word OR box; inputs `in1`..`inN`.
    OrBlock,
    /// Word AND box; inputs `in1`..`inN`.
    AndBlock,
    NotBlock,
    Comparator {
        op: CompareOp,
    },
    ArithmeticOp {
        op: ArithmeticOp,
    },
    EdgeDetector {
        polarity: EdgePolarity,
        form: EdgeForm,
    },
    /// A standard function. The name is the structured text function name.
    MathFunction {
        name: String,
    },
    TypeConversion {
        from: Option<String>,
        to: Option<String>,
    },
    /// A function or function block call, possibly with an instance.
    Call {
        block_name: String,
    },
    Jump {
        /// `JmpN`: jump when the condition is false.
        if_not: bool,
    },
    Label,
    Return,
    Exit,
    Continue,
    Move,
    SrLatch {
        variant: LatchVariant,
    },
    /// A vendor part without a conversion. Kept so that it is reported
    /// rather than silently dropped.
    Unsupported {
        name: String,
    },
}

/// Vendor function names and the structured text name they render as.
static FUNCTION_NAMES: phf::Map<&'static str, &'static str> = phf_map! {
    "Abs" => "ABS",
    "LIMIT" => "LIMIT",
    "Limit" => "LIMIT",
    "Sqr" => "SQR",
    "Sqrt" => "SQRT",
    "Round" => "ROUND",
    "Trunc" => "TRUNC",
    "Ceil" => "CEIL",
    "Floor" => "FLOOR",
    "Sin" => "SIN",
    "Cos" => "COS",
    "Tan" => "TAN",
    "Asin" => "ASIN",
    "Acos" => "ACOS",
    "Atan" => "ATAN",
    "Ln" => "LN",
    "Exp" => "EXP",
    "Expt" => "EXPT",
    "Min" => "MIN",
    "Max" => "MAX",
    "Sel" => "SEL",
    "Mux" => "MUX",
    "Len" => "LEN",
    "Concat" => "CONCAT",
    "Left" => "LEFT",
    "Right" => "RIGHT",
    "Mid" => "MID",
    "Find" => "FIND",
    "Replace" => "REPLACE",
    "Insert" => "INSERT",
    "Delete" => "DELETE",
    "String_to_Chars" => "Strg_TO_Chars",
    "Chars_to_String" => "Chars_TO_Strg",
    "Shl" => "SHL",
    "Shr" => "SHR",
    "Rol" => "ROL",
    "Ror" => "ROR",
    "Swap" => "SWAP",
    "Scale_X" => "SCALE_X",
    "Norm_X" => "NORM_X",
    "Neg" => "NEG",
    "Frac" => "FRAC",
    "InRange" => "IN_RANGE",
    "OutRange" => "OUT_RANGE",
    "MoveBlk" => "MOVE_BLK",
    "FillBlk" => "FILL_BLK",
    "UMoveBlk" => "UMOVE_BLK",
    "UFillBlk" => "UFILL_BLK",
    "CountOfElements" => "CountOfElements",
    "IsArray" => "IS_ARRAY",
    "Peek" => "PEEK",
    "Poke" => "POKE",
    "PeekBool" => "PEEK_BOOL",
    "Peek_Bool" => "PEEK_BOOL",
    "PokeBool" => "POKE_BOOL",
    "Poke_Bool" => "POKE_BOOL",
    "To_Int" => "TO_INT",
    "To_DInt" => "TO_DINT",
    "To_Real" => "TO_REAL",
    "To_LReal" => "TO_LREAL",
    "To_Bool" => "TO_BOOL",
    "To_Byte" => "TO_BYTE",
    "To_Word" => "TO_WORD",
    "To_DWord" => "TO_DWORD",
    "To_Time" => "TO_TIME",
    "To_SInt" => "TO_SINT",
    "To_USInt" => "TO_USINT",
    "To_UInt" => "TO_UINT",
    "To_UDInt" => "TO_UDINT",
    "To_String" => "TO_STRING",
    "To_WString" => "TO_WSTRING",
    "Bool_To_Int" => "BOOL_TO_INT",
    "Bool_To_DInt" => "BOOL_TO_DINT",
    "Bool_To_Byte" => "BOOL_TO_BYTE",
    "Int_To_Bool" => "INT_TO_BOOL",
    "DInt_To_Bool" => "DINT_TO_BOOL",
    "TypeOf" => "TypeOf",
    "VariantGet" => "VariantGet",
    "VariantPut" => "VariantPut",
    "Ref" => "REF",
    "RD_SYS_T" => "RD_SYS_T",
    "T_DIFF" => "T_DIFF",
    "T_COMBINE" => "T_COMBINE",
    "T_CONV" => "T_CONV",
    "T_ADD" => "T_ADD",
    "T_SUB" => "T_SUB",
    "SET_CINT" => "SET_CINT",
    "QRY_CINT" => "QRY_CINT",
    "CAN_CINT" => "CAN_CINT",
    "DIS_CINT" => "DIS_CINT",
    "EN_CINT" => "EN_CINT",
};

/// Functions that do not return a value and so are called as statements.
static VOID_FUNCTIONS: phf::Set<&'static str> = phf_set! {
    "MOVE_BLK",
    "FILL_BLK",
    "UMOVE_BLK",
    "UFILL_BLK",
};

impl PartKind {
    /// Classifies a part by the name the programming tool gives it.
    ///
    /// Names that are not built-in instructions are calls when the part
    /// carries an instance or was declared as a call; otherwise the part is
    /// unsupported.
    pub fn classify(
        name: &str,
        template_params: &BTreeMap<String, String>,
        negated: bool,
        is_call: bool,
    ) -> PartKind {
        match name {
            "Contact" if negated => PartKind::NegatedContact,
            "Contact" => PartKind::Contact,
            "Coil" => PartKind::Coil,
            "SCoil" => PartKind::SetCoil,
            "RCoil" => PartKind::ResetCoil,
            "O" | "Or" => PartKind::OrBlock,
            "And" => PartKind::AndBlock,
            "Not" => PartKind::NotBlock,
            "Eq" => PartKind::Comparator { op: CompareOp::Eq },
            "Ne" => PartKind::Comparator { op: CompareOp::Ne },
            "Gt" => PartKind::Comparator { op: CompareOp::Gt },
            "Lt" => PartKind::Comparator { op: CompareOp::Lt },
            "Ge" => PartKind::Comparator { op: CompareOp::Ge },
            "Le" => PartKind::Comparator { op: CompareOp::Le },
            "Add" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Add,
            },
            "Sub" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Sub,
            },
            "Mul" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Mul,
            },
            "Div" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Div,
            },
            "Mod" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Mod,
            },
            "Xor" => PartKind::ArithmeticOp {
                op: ArithmeticOp::Xor,
            },
            "PContact" => PartKind::EdgeDetector {
                polarity: EdgePolarity::Positive,
                form: EdgeForm::Contact,
            },
            "NContact" => PartKind::EdgeDetector {
                polarity: EdgePolarity::Negative,
                form: EdgeForm::Contact,
            },
            "PBox" => PartKind::EdgeDetector {
                polarity: EdgePolarity::Positive,
                form: EdgeForm::Box,
            },
            "NBox" => PartKind::EdgeDetector {
                polarity: EdgePolarity::Negative,
                form: EdgeForm::Box,
            },
            "Convert" => PartKind::TypeConversion {
                from: template_params.get("SrcType").cloned(),
                to: template_params.get("DestType").cloned(),
            },
            "Move" => PartKind::Move,
            "Sr" => PartKind::SrLatch {
                variant: LatchVariant::Sr,
            },
            "Rs" => PartKind::SrLatch {
                variant: LatchVariant::Rs,
            },
            "Jump" | "Jmp" => PartKind::Jump { if_not: false },
            "JmpN" => PartKind::Jump { if_not: true },
            "Label" => PartKind::Label,
            "Return" => PartKind::Return,
            "Exit" => PartKind::Exit,
            "Continue" => PartKind::Continue,
            other => {
                if let Some(function) = FUNCTION_NAMES.get(other) {
                    PartKind::MathFunction {
                        name: function.to_string(),
                    }
                } else if is_call {
                    PartKind::Call {
                        block_name: other.to_string(),
                    }
                } else {
                    PartKind::Unsupported {
                        name: other.to_string(),
                    }
                }
            }
        }
    }

    /// Whether the part is a function without return value.
    pub fn is_void_function(&self) -> bool {
        match self {
            PartKind::MathFunction { name } => VOID_FUNCTIONS.contains(name.as_str()),
            _ => false,
        }
    }

    /// A short name for the kind, used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            PartKind::Contact => "Contact".to_string(),
            PartKind::NegatedContact => "NegatedContact".to_string(),
            PartKind::Coil => "Coil".to_string(),
            PartKind::SetCoil => "SetCoil".to_string(),
            PartKind::ResetCoil => "ResetCoil".to_string(),
            PartKind::OrBlock => "OrBlock".to_string(),
            PartKind::AndBlock => "AndBlock".to_string(),
            PartKind::NotBlock => "NotBlock".to_string(),
            PartKind::Comparator { op } => format!("Comparator({})", op.symbol()),
            PartKind::ArithmeticOp { op } => format!("ArithmeticOp({})", op.symbol()),
            PartKind::EdgeDetector { polarity, .. } => {
                format!("EdgeDetector({})", polarity.marker())
            }
            PartKind::MathFunction { name } => format!("MathFunction({})", name),
            PartKind::TypeConversion { .. } => "TypeConversion".to_string(),
            PartKind::Call { block_name } => format!("Call({})", block_name),
            PartKind::Jump { if_not: false } => "Jump".to_string(),
            PartKind::Jump { if_not: true } => "JumpNot".to_string(),
            PartKind::Label => "Label".to_string(),
            PartKind::Return => "Return".to_string(),
            PartKind::Exit => "Exit".to_string(),
            PartKind::Continue => "Continue".to_string(),
            PartKind::Move => "Move".to_string(),
            PartKind::SrLatch { variant } => format!("SrLatch({:?})", variant),
            PartKind::Unsupported { name } => format!("Unsupported({})", name),
        }
    }
}
