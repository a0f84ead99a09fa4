use super::error::StreamError;

pub struct StreamReader<'a> {
    payload: &'a [u8],
}

impl<'a> StreamReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), StreamError> {
        if self.payload.len() < needed {
            return Err(StreamError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, StreamError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(StreamError::TooShort {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    /// Bytes from `offset` to the end of the buffer.
    pub fn read_tail(&self, offset: usize) -> Result<&'a [u8], StreamError> {
        self.payload.get(offset..).ok_or(StreamError::TooShort {
            needed: offset,
            actual: self.payload.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::StreamReader;
    use crate::protocols::stream::error::StreamError;

    #[test]
    fn read_tail_at_end_is_empty() {
        let payload = [0x05];
        let reader = StreamReader::new(&payload);
        assert!(reader.read_tail(1).unwrap().is_empty());
    }

    #[test]
    fn read_tail_past_end_too_short() {
        let payload = [0x05];
        let reader = StreamReader::new(&payload);
        let err = reader.read_tail(2).unwrap_err();
        assert_eq!(
            err,
            StreamError::TooShort {
                needed: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn read_u8_out_of_range() {
        let reader = StreamReader::new(&[]);
        assert!(matches!(
            reader.read_u8(0),
            Err(StreamError::TooShort { needed: 1, .. })
        ));
    }
}
