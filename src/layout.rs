//! Collage layouts: per-layout slot rectangles in normalized [0,1]
//! coordinates, registered per slot count.

use crate::error::{PostweaveError, PostweaveResult};

/// One slot of a collage layout, as fractions of the template box.
/// Slots need not tile exactly (edge slots absorb rounding slack) but
/// must lie within the unit box.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SlotRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SlotRect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn validate(&self) -> PostweaveResult<()> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.x) || !in_unit(self.y) {
            return Err(PostweaveError::validation(
                "slot origin must lie within the unit box",
            ));
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(PostweaveError::validation("slot extent must be > 0"));
        }
        if !in_unit(self.x + self.w) || !in_unit(self.y + self.h) {
            return Err(PostweaveError::validation(
                "slot must not extend past the unit box",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CollageLayout {
    pub key: String,
    pub name: String,
    pub slots: Vec<SlotRect>,
}

impl CollageLayout {
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn validate(&self) -> PostweaveResult<()> {
        if self.slots.is_empty() {
            return Err(PostweaveError::validation(format!(
                "layout '{}' must have at least one slot",
                self.key
            )));
        }
        for slot in &self.slots {
            slot.validate()?;
        }
        Ok(())
    }
}

/// Registration-ordered layout table. Ordering is part of the contract:
/// `layouts_for_slot_count` is how a caller enumerates choices, and the
/// enumeration must be stable.
#[derive(Clone, Debug)]
pub struct LayoutRegistry {
    layouts: Vec<CollageLayout>,
}

impl LayoutRegistry {
    pub fn builtin() -> Self {
        let s = SlotRect::new;
        let layout = |key: &str, name: &str, slots: Vec<SlotRect>| CollageLayout {
            key: key.to_string(),
            name: name.to_string(),
            slots,
        };

        Self {
            layouts: vec![
                layout(
                    "2-horizontal",
                    "2 Horizontal",
                    vec![s(0.0, 0.0, 0.5, 1.0), s(0.5, 0.0, 0.5, 1.0)],
                ),
                layout(
                    "2-vertical",
                    "2 Vertical",
                    vec![s(0.0, 0.0, 1.0, 0.5), s(0.0, 0.5, 1.0, 0.5)],
                ),
                layout(
                    "3-grid",
                    "3 Grid (1+2)",
                    vec![
                        s(0.0, 0.0, 1.0, 0.5),
                        s(0.0, 0.5, 0.5, 0.5),
                        s(0.5, 0.5, 0.5, 0.5),
                    ],
                ),
                layout(
                    "3-horizontal",
                    "3 Horizontal",
                    vec![
                        s(0.0, 0.0, 0.333, 1.0),
                        s(0.333, 0.0, 0.333, 1.0),
                        s(0.666, 0.0, 0.334, 1.0),
                    ],
                ),
                layout(
                    "3-vertical",
                    "3 Vertical",
                    vec![
                        s(0.0, 0.0, 1.0, 0.333),
                        s(0.0, 0.333, 1.0, 0.333),
                        s(0.0, 0.666, 1.0, 0.334),
                    ],
                ),
                layout(
                    "3-grid-alt",
                    "3 Grid (2+1)",
                    vec![
                        s(0.0, 0.0, 0.5, 0.5),
                        s(0.5, 0.0, 0.5, 0.5),
                        s(0.0, 0.5, 1.0, 0.5),
                    ],
                ),
                layout(
                    "4-grid",
                    "4 Grid (2x2)",
                    vec![
                        s(0.0, 0.0, 0.5, 0.5),
                        s(0.5, 0.0, 0.5, 0.5),
                        s(0.0, 0.5, 0.5, 0.5),
                        s(0.5, 0.5, 0.5, 0.5),
                    ],
                ),
                layout(
                    "4-horizontal",
                    "4 Horizontal",
                    vec![
                        s(0.0, 0.0, 0.25, 1.0),
                        s(0.25, 0.0, 0.25, 1.0),
                        s(0.5, 0.0, 0.25, 1.0),
                        s(0.75, 0.0, 0.25, 1.0),
                    ],
                ),
                layout(
                    "4-grid-alt",
                    "4 Grid (1+3)",
                    vec![
                        s(0.0, 0.0, 1.0, 0.5),
                        s(0.0, 0.5, 0.333, 0.5),
                        s(0.333, 0.5, 0.333, 0.5),
                        s(0.666, 0.5, 0.334, 0.5),
                    ],
                ),
                layout(
                    "5-grid",
                    "5 Grid (2+3)",
                    vec![
                        s(0.0, 0.0, 0.5, 0.5),
                        s(0.5, 0.0, 0.5, 0.5),
                        s(0.0, 0.5, 0.333, 0.5),
                        s(0.333, 0.5, 0.333, 0.5),
                        s(0.666, 0.5, 0.334, 0.5),
                    ],
                ),
                layout(
                    "5-grid-alt",
                    "5 Grid (1+4)",
                    vec![
                        s(0.0, 0.0, 1.0, 0.5),
                        s(0.0, 0.5, 0.25, 0.5),
                        s(0.25, 0.5, 0.25, 0.5),
                        s(0.5, 0.5, 0.25, 0.5),
                        s(0.75, 0.5, 0.25, 0.5),
                    ],
                ),
                layout(
                    "6-grid",
                    "6 Grid (2x3)",
                    vec![
                        s(0.0, 0.0, 0.333, 0.5),
                        s(0.333, 0.0, 0.333, 0.5),
                        s(0.666, 0.0, 0.334, 0.5),
                        s(0.0, 0.5, 0.333, 0.5),
                        s(0.333, 0.5, 0.333, 0.5),
                        s(0.666, 0.5, 0.334, 0.5),
                    ],
                ),
                layout(
                    "6-grid-alt",
                    "6 Grid (3x2)",
                    vec![
                        s(0.0, 0.0, 0.5, 0.333),
                        s(0.5, 0.0, 0.5, 0.333),
                        s(0.0, 0.333, 0.5, 0.333),
                        s(0.5, 0.333, 0.5, 0.333),
                        s(0.0, 0.666, 0.5, 0.334),
                        s(0.5, 0.666, 0.5, 0.334),
                    ],
                ),
                layout(
                    "8-grid",
                    "8 Grid (4x2)",
                    vec![
                        s(0.0, 0.0, 0.25, 0.5),
                        s(0.25, 0.0, 0.25, 0.5),
                        s(0.5, 0.0, 0.25, 0.5),
                        s(0.75, 0.0, 0.25, 0.5),
                        s(0.0, 0.5, 0.25, 0.5),
                        s(0.25, 0.5, 0.25, 0.5),
                        s(0.5, 0.5, 0.25, 0.5),
                        s(0.75, 0.5, 0.25, 0.5),
                    ],
                ),
            ],
        }
    }

    /// Adds a caller-defined layout after validating its slots.
    pub fn register(&mut self, layout: CollageLayout) -> PostweaveResult<()> {
        layout.validate()?;
        if self.layouts.iter().any(|l| l.key == layout.key) {
            return Err(PostweaveError::validation(format!(
                "layout key '{}' is already registered",
                layout.key
            )));
        }
        self.layouts.push(layout);
        Ok(())
    }

    pub fn get(&self, key: &str) -> PostweaveResult<&CollageLayout> {
        self.layouts
            .iter()
            .find(|l| l.key == key)
            .ok_or_else(|| PostweaveError::UnknownLayout(key.to_string()))
    }

    /// Every layout with exactly `n` slots, in registration order.
    pub fn layouts_for_slot_count(&self, n: usize) -> Vec<&CollageLayout> {
        self.layouts
            .iter()
            .filter(|l| l.slot_count() == n)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollageLayout> {
        self.layouts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_layouts_all_validate() {
        for layout in LayoutRegistry::builtin().iter() {
            layout.validate().unwrap();
        }
    }

    #[test]
    fn slot_count_enumeration_is_stable() {
        let reg = LayoutRegistry::builtin();
        let threes: Vec<&str> = reg
            .layouts_for_slot_count(3)
            .iter()
            .map(|l| l.key.as_str())
            .collect();
        assert_eq!(threes, ["3-grid", "3-horizontal", "3-vertical", "3-grid-alt"]);

        let fours: Vec<&str> = reg
            .layouts_for_slot_count(4)
            .iter()
            .map(|l| l.key.as_str())
            .collect();
        assert_eq!(fours, ["4-grid", "4-horizontal", "4-grid-alt"]);

        assert!(reg.layouts_for_slot_count(7).is_empty());
    }

    #[test]
    fn unknown_key_fails_fast() {
        let reg = LayoutRegistry::builtin();
        assert!(matches!(
            reg.get("9-grid"),
            Err(PostweaveError::UnknownLayout(_))
        ));
    }

    #[test]
    fn register_validates_and_rejects_duplicates() {
        let mut reg = LayoutRegistry::builtin();

        let bad = CollageLayout {
            key: "bad".into(),
            name: "Bad".into(),
            slots: vec![SlotRect::new(0.5, 0.5, 0.6, 0.5)],
        };
        assert!(reg.register(bad).is_err());

        let dup = CollageLayout {
            key: "3-grid".into(),
            name: "Dup".into(),
            slots: vec![SlotRect::new(0.0, 0.0, 1.0, 1.0)],
        };
        assert!(reg.register(dup).is_err());

        let ok = CollageLayout {
            key: "1-full".into(),
            name: "Full".into(),
            slots: vec![SlotRect::new(0.0, 0.0, 1.0, 1.0)],
        };
        reg.register(ok).unwrap();
        assert_eq!(reg.layouts_for_slot_count(1)[0].key, "1-full");
    }
}
