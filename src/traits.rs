//! Abstraction traits and implementations over the text being searched

/// Randomly-addressable text to be searched over
///
/// This is the only thing the matching engine needs from its host: a length and constant-time
/// access to the character at any position. An editor's document buffer typically implements this
/// directly; for plain in-memory text, the implementations for `[char]` and `Vec<char>` are
/// provided.
pub trait Text {
    /// The number of characters in the text
    fn len(&self) -> usize;

    /// Returns the character at `pos`
    ///
    /// Callers only ever provide positions in `0..self.len()`.
    fn char_at(&self, pos: usize) -> char;

    /// Returns true if the text contains no characters
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Text for [char] {
    fn len(&self) -> usize {
        <[char]>::len(self)
    }

    fn char_at(&self, pos: usize) -> char {
        self[pos]
    }
}

impl Text for Vec<char> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn char_at(&self, pos: usize) -> char {
        self[pos]
    }
}

impl<T: Text + ?Sized> Text for &T {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn char_at(&self, pos: usize) -> char {
        (**self).char_at(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::Text;

    #[test]
    fn char_slices() {
        let chars: Vec<char> = "héllo".chars().collect();
        assert_eq!(Text::len(&chars), 5);
        assert_eq!(chars.char_at(1), 'é');

        let slice: &[char] = &chars[1..];
        assert_eq!(Text::len(slice), 4);
        assert_eq!(slice.char_at(0), 'é');
        assert!(!Text::is_empty(slice));
        assert!(Text::is_empty(&chars[..0]));
    }
}
