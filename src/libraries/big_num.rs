//! 128, 256 and 512 bit numbers used as overflow-safe intermediates for Q64.64 math.
use uint::construct_uint;

construct_uint! {
    pub struct U128(2);
}

construct_uint! {
    pub struct U256(4);
}

construct_uint! {
    pub struct U512(8);
}
