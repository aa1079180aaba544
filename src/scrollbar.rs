//! Vertical scrollbar adjustment next to the drawing surface.

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scrollbar {
    visible: bool,
    min: f64,
    max: f64,
    page_size: f64,
    value: f64,
}

impl Scrollbar {
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn page_size(&self) -> f64 {
        self.page_size
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Largest reachable value: the page must fit before `max`.
    pub fn upper_value(&self) -> f64 {
        (self.max - self.page_size).max(self.min)
    }

    /// Change the range, keeping the current value if it still fits.
    /// Returns the new value when clamping moved it. Non-finite bounds are
    /// ignored.
    pub fn configure(&mut self, min: f64, max: f64, page_size: f64) -> Option<f64> {
        if !(min.is_finite() && max.is_finite() && page_size.is_finite()) {
            tracing::warn!(min, max, page_size, "ignoring non-finite scrollbar range");
            return None;
        }
        self.min = min;
        self.max = max;
        self.page_size = page_size.max(0.0);
        self.set_value(self.value)
    }

    /// Returns the new value if it differs from the old one.
    pub fn set_value(&mut self, value: f64) -> Option<f64> {
        if value.is_nan() {
            return None;
        }
        let clamped = value.clamp(self.min, self.upper_value());
        if clamped == self.value {
            return None;
        }
        self.value = clamped;
        Some(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_is_clamped_to_the_page() {
        let mut bar = Scrollbar::default();
        bar.configure(0.0, 100.0, 20.0);
        assert_eq!(bar.set_value(95.0), Some(80.0));
        assert_eq!(bar.set_value(80.0), None);
        assert_eq!(bar.set_value(-5.0), Some(0.0));
    }

    #[test]
    fn shrinking_the_range_moves_the_value() {
        let mut bar = Scrollbar::default();
        bar.configure(0.0, 100.0, 10.0);
        bar.set_value(70.0);
        assert_eq!(bar.configure(0.0, 50.0, 10.0), Some(40.0));
        assert_eq!(bar.configure(0.0, 60.0, 10.0), None);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut bar = Scrollbar::default();
        bar.configure(0.0, 100.0, 10.0);
        bar.set_value(30.0);
        assert_eq!(bar.configure(f64::NAN, 100.0, 10.0), None);
        assert_eq!(bar.configure(0.0, f64::INFINITY, 10.0), None);
        assert_eq!(bar.configure(0.0, 100.0, f64::NAN), None);
        assert_eq!((bar.min(), bar.max(), bar.page_size()), (0.0, 100.0, 10.0));
        assert_eq!(bar.set_value(f64::NAN), None);
        assert_eq!(bar.value(), 30.0);
    }

    #[test]
    fn page_larger_than_range_pins_to_min() {
        let mut bar = Scrollbar::default();
        bar.configure(10.0, 20.0, 50.0);
        assert_eq!(bar.value(), 10.0);
        assert_eq!(bar.upper_value(), 10.0);
        assert_eq!(bar.set_value(15.0), None);
    }
}
