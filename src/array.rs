use std::mem::replace;
use std::ops::{Index, IndexMut};
use std::slice;

use crate::errors::{Error, Result};

// -----------------------------------------------------------------------------
// 		- FixedArray -
// -----------------------------------------------------------------------------
/// `FixedArray`: an owned heap array with a length fixed at creation.
///
/// The array is moved, never implicitly copied, and the storage is released
/// exactly once when the owner is dropped.
///
/// # Example
///
/// ```
/// use handoff::FixedArray;
///
/// let mut slots = FixedArray::<u32>::new(3);
/// slots[1] = 7;
///
/// let moved = slots;
/// assert_eq!(moved.len(), 3);
/// assert_eq!(moved[1], 7);
/// ```
#[derive(Debug, PartialEq, Eq)]
pub struct FixedArray<T> {
    inner: Box<[T]>,
}


// -----------------------------------------------------------------------------
// 		- Impl FixedArray -
// -----------------------------------------------------------------------------
impl<T: Default> FixedArray<T> {
    /// Create an array of `len` default values.
    ///
    /// # Example
    ///
    /// ```
    /// # use handoff::FixedArray;
    /// let v = FixedArray::<bool>::new(10);
    /// assert_eq!(v.len(), 10);
    /// assert!(v.iter().all(|b| !b));
    /// ```
    pub fn new(len: usize) -> Self {
        Self {
            inner: (0..len).map(|_| T::default()).collect(),
        }
    }
}

impl<T> FixedArray<T> {
    /// Take ownership of the values in a `Vec`.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self {
            inner: values.into_boxed_slice(),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the array has no slots
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the value at a specific index
    pub fn get(&self, index: usize) -> Option<&T> {
        self.inner.get(index)
    }

    /// Get a mutable value at a specific index
    ///
    /// # Example
    ///
    /// ```
    /// # use handoff::FixedArray;
    /// let mut v = FixedArray::from_vec(vec!["original".to_string()]);
    /// v.get_mut(0).map(|s| *s = "changed".to_string()).unwrap();
    /// assert_eq!(&v[0], "changed");
    /// ```
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.inner.get_mut(index)
    }

    /// Replace the value at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.len();
        match self.inner.get_mut(index) {
            Some(slot) => Ok(replace(slot, value)),
            None => Err(Error::OutOfBounds { index, len }),
        }
    }

    /// Iterate over the values
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.inner.iter()
    }

    /// Iterate over mutable values
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.inner.iter_mut()
    }

    /// Give up ownership of the storage
    pub fn into_vec(self) -> Vec<T> {
        self.inner.into_vec()
    }
}


// -----------------------------------------------------------------------------
// 		- impl Index -
// -----------------------------------------------------------------------------
impl<T> Index<usize> for FixedArray<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.inner.get(index) {
            Some(v) => v,
            None => panic!("index {} out of bounds for length {}", index, self.len()),
        }
    }
}

// -----------------------------------------------------------------------------
// 		- impl IndexMut -
// -----------------------------------------------------------------------------
impl<T> IndexMut<usize> for FixedArray<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len();
        match self.inner.get_mut(index) {
            Some(v) => v,
            None => panic!("index {} out of bounds for length {}", index, len),
        }
    }
}

impl<'a, T> IntoIterator for &'a FixedArray<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> slice::Iter<'a, T> {
        self.inner.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn new_is_default_filled() {
        let v = FixedArray::<u32>::new(4);
        assert_eq!(v.len(), 4);
        assert_eq!(v.into_vec(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_array() {
        let v = FixedArray::<u32>::new(0);
        assert!(v.is_empty());
        assert_eq!(v.get(0), None);
    }

    #[test]
    fn set_returns_previous() -> Result<()> {
        let mut v = FixedArray::from_vec(vec![1, 2, 3]);
        assert_eq!(v.set(1, 20)?, 2);
        assert_eq!(v[1], 20);
        Ok(())
    }

    #[test]
    fn set_out_of_bounds() {
        let mut v = FixedArray::from_vec(vec![1, 2, 3]);
        match v.set(3, 4) {
            Err(Error::OutOfBounds { index: 3, len: 3 }) => {}
            _ => panic!("Should return an OutOfBounds error"),
        }
        assert_eq!(v.into_vec(), vec![1, 2, 3]);
    }

    #[test]
    #[should_panic]
    fn index_out_of_bounds() {
        let v = FixedArray::<u8>::new(2);
        let _ = v[2];
    }

    #[test]
    fn iter_mut() {
        let mut v = FixedArray::from_vec(vec![1, 2, 3]);
        v.iter_mut().for_each(|n| *n *= 2);
        assert_eq!(v.iter().sum::<i32>(), 12);
    }

    #[test]
    fn values_dropped_once() {
        let counter = Rc::new(());
        let v = FixedArray::from_vec(vec![counter.clone(), counter.clone()]);
        assert_eq!(Rc::strong_count(&counter), 3);

        let moved = v;
        assert_eq!(Rc::strong_count(&counter), 3);

        drop(moved);
        assert_eq!(Rc::strong_count(&counter), 1);
    }
}
