use std::ops::Range;

/// A named tensor's position inside a flat parameter buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: &'static str,
    pub shape: Vec<usize>,
    pub range: Range<usize>,
}

impl TensorSpec {
    /// Number of elements in this tensor.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Maps a flat parameter buffer into an ordered list of named tensors.
/// This is the core "offsets + shapes" mechanism: checkpointing and
/// initialization address the buffer exclusively through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLayout {
    tensors: Vec<TensorSpec>,
    len: usize,
}

impl ParamLayout {
    /// Builds a layout by packing the given `(name, shape)` tensors
    /// back-to-back, in order, starting at offset 0.
    pub fn new<I>(tensors: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Vec<usize>)>,
    {
        let mut offset = 0;
        let tensors = tensors
            .into_iter()
            .map(|(name, shape)| {
                let len: usize = shape.iter().product();
                let range = offset..offset + len;
                offset += len;
                TensorSpec { name, shape, range }
            })
            .collect();

        Self { tensors, len: offset }
    }

    /// Total number of parameters across all tensors.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Tensors in flat-buffer order.
    #[inline]
    pub fn tensors(&self) -> &[TensorSpec] {
        &self.tensors
    }

    /// Looks up a tensor by name.
    pub fn tensor(&self, name: &str) -> Option<&TensorSpec> {
        self.tensors.iter().find(|t| t.name == name)
    }
}
