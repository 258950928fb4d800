//! Network shape.
//!
//! A `LayerSpec` lists the input feature count followed by the width of every
//! layer, so `[784, 20, 10]` is a two-layer network with 784 inputs.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct LayerSpec {
    widths: Vec<usize>,
}

impl LayerSpec {
    /// Validate and wrap a width sequence.
    ///
    /// `widths` includes the input dimension, so its length must be at least 2.
    pub fn new(widths: Vec<usize>) -> Result<Self> {
        if widths.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "layer widths must include input and output dims, got {} entries",
                widths.len()
            )));
        }
        if let Some(idx) = widths.iter().position(|&w| w == 0) {
            return Err(Error::InvalidConfig(format!(
                "all layer widths must be > 0, entry {idx} is 0"
            )));
        }
        Ok(Self { widths })
    }

    #[inline]
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    #[inline]
    pub fn input_dim(&self) -> usize {
        self.widths[0]
    }

    #[inline]
    pub fn output_dim(&self) -> usize {
        self.widths[self.widths.len() - 1]
    }

    /// Number of weighted layers (L).
    #[inline]
    pub fn num_layers(&self) -> usize {
        self.widths.len() - 1
    }

    /// `(fan_in, fan_out)` for layers 1..=L, in order.
    pub fn layer_dims(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.widths.windows(2).map(|w| (w[0], w[1]))
    }
}

impl TryFrom<Vec<usize>> for LayerSpec {
    type Error = Error;

    fn try_from(value: Vec<usize>) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LayerSpec> for Vec<usize> {
    fn from(value: LayerSpec) -> Self {
        value.widths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_widths() {
        assert!(LayerSpec::new(vec![]).is_err());
        assert!(LayerSpec::new(vec![4]).is_err());
        assert!(matches!(
            LayerSpec::new(vec![4, 0, 2]),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn layer_dims_pairs_consecutive_widths() {
        let spec = LayerSpec::new(vec![784, 20, 7, 10]).unwrap();
        assert_eq!(spec.num_layers(), 3);
        assert_eq!(spec.input_dim(), 784);
        assert_eq!(spec.output_dim(), 10);
        let dims: Vec<_> = spec.layer_dims().collect();
        assert_eq!(dims, vec![(784, 20), (20, 7), (7, 10)]);
    }

    #[test]
    fn deserialization_validates() {
        let ok: LayerSpec = serde_json::from_str("[3, 4, 1]").unwrap();
        assert_eq!(ok.widths(), &[3, 4, 1]);
        assert!(serde_json::from_str::<LayerSpec>("[3, 0, 1]").is_err());
    }
}
