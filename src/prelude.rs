//! This module re-exports the types most programs need from this crate.
//! It is intended to be glob imported as `use teddy_dd::prelude::*;`.

pub use crate::diagram::{evaluate, Diagram, DiagramManager};
pub use crate::domain::Domain;
pub use crate::manager::{ManagerConfig, NodeManager};
pub use crate::operators::{
    And, EqualTo, Greater, GreaterEqual, Less, LessEqual, Max, Min, Multiplies, Nand, Nor,
    NotEqualTo, Operator, Or, PiConj, Plus, Xor,
};
pub use crate::pla::{parse_pla, CubeValue, ParsedPla, PlaParseError, Product};
pub use crate::user_data::UserData;
