use crate::bag::AttributeBag;

pub const LOG: &str = "Log";
pub const TODO: &str = "Todo";

/// Defaults shared by free-text kinds
pub fn init_text(bag: &mut AttributeBag) {
    bag.set("txt", "");
}
