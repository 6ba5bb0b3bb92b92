//! Flat word-addressed machine memory.

use crate::error::LoadError;
use crate::machine::Word;

/// A fixed number of zero-initialised cells addressed by non-negative index.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: Vec<Word>,
}

impl Memory {
    /// Allocate `cells` zeroed words, failing instead of aborting when the
    /// allocation is impossible.
    pub fn new(cells: usize) -> Result<Self, LoadError> {
        let mut words = Vec::new();
        words
            .try_reserve_exact(cells)
            .map_err(|_| LoadError::MemoryTooLarge { cells })?;
        words.resize(cells, 0);
        Ok(Self { cells: words })
    }

    /// Copy `image` into `memory[0..]`, sign-extending each word.
    pub fn preload(&mut self, image: &[i32]) -> Result<(), LoadError> {
        if image.len() > self.cells.len() {
            return Err(LoadError::MemoryImageTooLarge {
                words: image.len(),
                cells: self.cells.len(),
            });
        }
        for (cell, &word) in self.cells.iter_mut().zip(image) {
            *cell = Word::from(word);
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// Map an address to a cell index, or `None` if it is out of range.
    pub fn index(&self, address: Word) -> Option<usize> {
        usize::try_from(address)
            .ok()
            .filter(|&index| index < self.cells.len())
    }

    /// Read the cell at an index obtained from [`Memory::index`].
    pub fn get(&self, index: usize) -> Word {
        self.cells[index]
    }

    /// Write the cell at an index obtained from [`Memory::index`].
    pub fn set(&mut self, index: usize, value: Word) {
        self.cells[index] = value;
    }

    /// Read the cell at `address`, `None` if it is out of range.
    pub fn load(&self, address: Word) -> Option<Word> {
        self.index(address).map(|index| self.cells[index])
    }
}
