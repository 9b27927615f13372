//! Allocation bases as policies over one edge set.
//!
//! Both bases start from the same edges and only change which co-product
//! edge is functional and with what allocation factor.

use serde::{Deserialize, Serialize};

use crate::edge::EdgeSet;
use crate::error::{ConfigurationError, LcaResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationBasis {
    /// The secondary product substitutes its market dataset and is credited
    /// against the primary product.
    #[default]
    Credit,
    /// The impact is split between both products by their exergy share.
    ByExergy,
}

impl AllocationBasis {
    pub fn name(self) -> &'static str {
        match self {
            AllocationBasis::Credit => "credit",
            AllocationBasis::ByExergy => "by_exergy",
        }
    }
}

impl std::fmt::Display for AllocationBasis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The two co-products of a model and the primary product's exergy share.
#[derive(Debug, Clone, PartialEq)]
pub struct CoProducts {
    pub primary: String,
    pub secondary: String,
    /// Exergy share of the primary product, in [0, 1].
    pub primary_share: f64,
}

impl CoProducts {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>, primary_share: f64) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
            primary_share,
        }
    }
}

impl AllocationBasis {
    /// Edge set with functional flags and factors set for this basis.
    pub fn apply(self, edges: &EdgeSet, products: &CoProducts) -> LcaResult<EdgeSet> {
        let share = products.primary_share;
        if !(0.0..=1.0).contains(&share) {
            return Err(ConfigurationError::InvalidFactor {
                what: "exergy share",
                value: share,
            }
            .into());
        }

        let mut out = edges.clone();
        let (primary_factor, secondary) = match self {
            AllocationBasis::Credit => (1.0, None),
            AllocationBasis::ByExergy => (share, Some(1.0 - share)),
        };

        let primary = out.require_mut(&products.primary)?;
        primary.functional = true;
        primary.allocation_factor = primary_factor;

        let edge = out.require_mut(&products.secondary)?;
        // A co-product that was not produced stays a plain output.
        let secondary = secondary.filter(|&f| f > 0.0 || edge.amount.magnitude() != 0.0);
        match secondary {
            Some(factor) => {
                edge.functional = true;
                edge.allocation_factor = factor;
            }
            None => {
                edge.functional = false;
                edge.allocation_factor = 1.0;
            }
        }
        Ok(out)
    }
}
