/// Keyboard focus within one menu level
///
/// Pure state: the view tells it which rows can take focus.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListState {
    focused: Option<usize>,
}

impl ListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    /// Focus `index` if it is selectable
    pub fn focus(&mut self, index: usize, selectable: &[bool]) -> bool {
        if selectable.get(index).copied().unwrap_or(false) {
            self.focused = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.focused = None;
    }

    /// Focus the next selectable row (wraps around)
    pub fn focus_next(&mut self, selectable: &[bool]) {
        self.focused = Self::find_next_selectable(selectable, self.focused, true);
    }

    /// Focus the previous selectable row (wraps around)
    pub fn focus_previous(&mut self, selectable: &[bool]) {
        self.focused = Self::find_next_selectable(selectable, self.focused, false);
    }

    fn find_next_selectable(
        selectable: &[bool],
        current: Option<usize>,
        forward: bool,
    ) -> Option<usize> {
        let len = selectable.len();
        if len == 0 {
            return None;
        }

        let step = |idx: usize| {
            if forward {
                (idx + 1) % len
            } else if idx == 0 {
                len - 1
            } else {
                idx - 1
            }
        };

        let start = match current {
            Some(idx) => step(idx.min(len - 1)),
            None if forward => 0,
            None => len - 1,
        };

        let mut idx = start;
        for _ in 0..len {
            if selectable[idx] {
                return Some(idx);
            }
            idx = step(idx);
        }

        // Nothing selectable: keep whatever was focused
        current
    }
}
