pub mod numeric;

pub use numeric::{cast_element, Element, FloatElement, FloatLike, RealElement};
