/// Half-open integer rectangle `[min_x, max_x) × [min_y, max_y)`.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Rect {
    #[inline]
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Rectangle with origin at `(0, 0)`.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn width(&self) -> u64 {
        (self.max_x as i64 - self.min_x as i64).max(0) as u64
    }

    #[inline]
    pub fn height(&self) -> u64 {
        (self.max_y as i64 - self.min_y as i64).max(0) as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Returns the point of the rectangle closest to `(x, y)`.
    ///
    /// # Panics
    /// Panics in debug builds if the rectangle is empty.
    #[inline]
    pub fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        debug_assert!(!self.is_empty());
        (
            x.clamp(self.min_x, self.max_x - 1),
            y.clamp(self.min_y, self.max_y - 1),
        )
    }

    /// Same size, moved so that the top-left corner is at `(min_x, min_y)`.
    #[inline]
    pub fn translate_to(&self, min_x: i32, min_y: i32) -> Self {
        Self::new(
            min_x,
            min_y,
            (min_x as i64 + self.width() as i64) as i32,
            (min_y as i64 + self.height() as i64) as i32,
        )
    }

    pub fn intersection(&self, other: Self) -> Self {
        let r = Self::new(
            self.min_x.max(other.min_x),
            self.min_y.max(other.min_y),
            self.max_x.min(other.max_x),
            self.max_y.min(other.max_y),
        );
        if r.is_empty() {
            Self::default()
        } else {
            r
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn size() {
        let r = Rect::new(-2, 3, 5, 4);
        assert_eq!(r.width(), 7);
        assert_eq!(r.height(), 1);
        assert!(!r.is_empty());
        assert!(Rect::new(4, 0, 2, 8).is_empty());
        assert_eq!(Rect::new(i32::MIN, 0, i32::MAX, 1).width(), u32::MAX as u64);
    }

    #[test]
    fn clamp_to_edge() {
        let r = Rect::new(1, 1, 4, 3);
        assert_eq!(r.clamp(-10, 0), (1, 1));
        assert_eq!(r.clamp(2, 2), (2, 2));
        assert_eq!(r.clamp(100, 100), (3, 2));
    }

    #[test]
    fn intersection() {
        let a = Rect::new(0, 0, 10, 10);
        assert_eq!(a.intersection(Rect::new(5, -5, 20, 5)), Rect::new(5, 0, 10, 5));
        assert!(a.intersection(Rect::new(10, 0, 20, 5)).is_empty());
    }
}
