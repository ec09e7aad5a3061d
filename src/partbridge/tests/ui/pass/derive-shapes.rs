use partbridge::prelude::*;

#[derive(Part)]
pub struct Unit;

#[derive(Part)]
pub struct Plain {
    pub value: i32,
}

#[derive(Part)]
#[part(not_composable)]
pub struct OptedOut {
    #[import]
    pub value: Option<i32>,
}

#[derive(Default, Part)]
pub struct Inner {
    #[import(name = "inner")]
    pub value: Option<i32>,
}

#[derive(Default, Part)]
pub struct Outer {
    #[import]
    pub direct: Option<String>,
    #[import(recompose)]
    pub live: Option<u64>,
    #[import(flatten)]
    pub inner: Inner,
}

fn main() {
    let outer = Outer::default();
    assert_eq!(outer.imports().len(), 3);
    assert!(!outer.not_composable());
    assert!(OptedOut { value: None }.not_composable());
    assert!(Unit.imports().is_empty());
}
