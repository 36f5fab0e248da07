/// Item drop produced by a loot table or rewritten by a death observer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemStack {
    pub item: String,
    pub amount: u32,
}

impl ItemStack {
    pub const AIR: &'static str = "air";

    pub fn new(item: impl Into<String>, amount: u32) -> Self {
        Self {
            item: item.into(),
            amount,
        }
    }

    /// Empty stacks (zero amount or air) are never released into the world.
    pub fn is_empty(&self) -> bool {
        self.amount == 0 || self.item.is_empty() || self.item.eq_ignore_ascii_case(Self::AIR)
    }

    /// Returns a copy whose amount is multiplied, saturating at `u32::MAX`.
    pub fn multiplied(&self, factor: u32) -> Self {
        Self {
            item: self.item.clone(),
            amount: self.amount.saturating_mul(factor),
        }
    }
}
