mod accessory_map;
mod map;
mod value;

pub use accessory_map::AccessoryStateMap;
pub use map::StateMap;
pub use value::StateValue;
