use bytemuck::{Pod, Zeroable};

/// Capacity-tracked CPU buffer. The backing storage is always fully
/// initialised and only ever grows, by exact doubling, keeping its contents.
#[derive(Debug, Clone)]
pub struct GrowableBuffer<T: Pod> {
    label: &'static str,
    data: Vec<T>,
}

impl<T: Pod + Zeroable> GrowableBuffer<T> {
    pub fn with_capacity(label: &'static str, capacity: usize) -> Self {
        Self {
            label,
            data: vec![T::zeroed(); capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Doubles capacity until `required` elements fit. Returns whether the
    /// buffer grew.
    pub fn reserve(&mut self, required: usize) -> bool {
        let old = self.data.len();
        if required <= old {
            return false;
        }

        let mut new_capacity = old;
        while new_capacity < required {
            new_capacity *= 2;
        }

        log::info!(
            "Growing {} buffer: {} -> {}",
            self.label,
            old,
            new_capacity
        );
        self.data.resize(new_capacity, T::zeroed());
        true
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Raw bytes of the first `len` elements.
    pub fn bytes(&self, len: usize) -> &[u8] {
        bytemuck::cast_slice(&self.data[..len])
    }
}
