//! Overlapping fixed-size windows over large documents

use crate::error::ExtractorError;

/// A window of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position in split order
    pub index: usize,
    /// Offset of the first char, in chars
    pub start: usize,
    /// The window text
    pub text: &'a str,
}

impl Chunk<'_> {
    /// Length in chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits documents into windows of `size` chars, consecutive windows sharing `overlap` chars
#[derive(Debug, Clone, Copy)]
pub struct ChunkSplitter {
    size: usize,
    overlap: usize,
}

impl ChunkSplitter {
    /// Create a splitter; fails unless `0 < size` and `overlap < size`
    pub fn new(size: usize, overlap: usize) -> Result<Self, ExtractorError> {
        if size == 0 || overlap >= size {
            return Err(ExtractorError::InvalidChunking { size, overlap });
        }
        Ok(Self { size, overlap })
    }

    /// Distance in chars between consecutive window starts
    pub fn stride(&self) -> usize {
        self.size - self.overlap
    }

    /// Split `document` into windows
    ///
    /// Windows start at 0 and every `stride()` chars after that while the
    /// start is inside the document; the last window may be shorter.
    ///
    /// # Examples
    ///
    /// ```
    /// use harvest_extractor::ChunkSplitter;
    ///
    /// let splitter = ChunkSplitter::new(4, 1).unwrap();
    /// let chunks = splitter.split("abcdefghij");
    /// let texts: Vec<&str> = chunks.iter().map(|c| c.text).collect();
    /// assert_eq!(texts, vec!["abcd", "defg", "ghij", "j"]);
    /// ```
    pub fn split<'a>(&self, document: &'a str) -> Vec<Chunk<'a>> {
        // Byte offset of every char boundary, including the end of the text.
        let boundaries: Vec<usize> = document
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(document.len()))
            .collect();
        let total = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        while start < total {
            let end = (start + self.size).min(total);
            chunks.push(Chunk {
                index: chunks.len(),
                start,
                text: &document[boundaries[start]..boundaries[end]],
            });
            start += self.stride();
        }
        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(matches!(
            ChunkSplitter::new(10, 10),
            Err(ExtractorError::InvalidChunking { size: 10, overlap: 10 })
        ));
        assert!(ChunkSplitter::new(10, 11).is_err());
        assert!(ChunkSplitter::new(0, 0).is_err());
        assert!(ChunkSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn test_empty_document_has_no_chunks() {
        let splitter = ChunkSplitter::new(5, 1).unwrap();
        assert!(splitter.split("").is_empty());
    }

    #[test]
    fn test_short_document_is_one_chunk() {
        let splitter = ChunkSplitter::new(100, 10).unwrap();
        let chunks = splitter.split("short");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn test_offsets_are_in_chars() {
        let splitter = ChunkSplitter::new(3, 1).unwrap();
        let chunks = splitter.split("äöüßéè");

        let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 2, 4]);
        assert_eq!(chunks[1].text, "üßé");
        assert_eq!(chunks[2].text, "éè");
    }

    #[test]
    fn test_forty_thousand_chars_make_three_chunks() {
        let document = "x".repeat(40_000);
        let splitter = ChunkSplitter::new(15_000, 1_000).unwrap();
        let chunks = splitter.split(&document);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].start, 14_000);
        assert_eq!(chunks[2].start, 28_000);
        assert_eq!(chunks[2].char_len(), 12_000);
    }
}
