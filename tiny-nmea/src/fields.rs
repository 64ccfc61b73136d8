use core::str::Split;

/// The comma separated fields of a sentence after its message id.
///
/// Empty fields are kept as zero-length slices, so field `n` is always the
/// `n`th field of the sentence. Cloning is cheap and every lookup starts over
/// from the first field.
#[derive(Clone)]
pub struct Fields<'a> {
    split: Split<'a, char>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(split: Split<'a, char>) -> Self {
        Self { split }
    }

    pub fn iter(&self) -> Split<'a, char> {
        self.split.clone()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.iter().nth(index)
    }

    /// Like [`Fields::get`], missing trailing fields read as empty.
    pub fn get_or_empty(&self, index: usize) -> &'a str {
        self.get(index).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }
}
