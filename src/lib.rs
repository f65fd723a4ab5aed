//! dicespin: shake a row of dice, let them settle, read the total.

pub mod shaker;
