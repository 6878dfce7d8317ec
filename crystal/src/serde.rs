use std::{fmt, marker::PhantomData};

use ::serde::{
    de::{Error, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::matrix::Matrix;

/// Serialized as a flat, row-major sequence of `R * C` elements.
impl<T, const R: usize, const C: usize> Serialize for Matrix<T, R, C>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(R * C))?;
        for element in self.data.iter().flatten() {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl<'de, T, const R: usize, const C: usize> Deserialize<'de> for Matrix<T, R, C>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(MatrixVisitor::new())
    }
}

struct MatrixVisitor<T, const R: usize, const C: usize> {
    _marker: PhantomData<T>,
}

impl<T, const R: usize, const C: usize> MatrixVisitor<T, R, C> {
    fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<'de, T, const R: usize, const C: usize> Visitor<'de> for MatrixVisitor<T, R, C>
where
    T: Deserialize<'de>,
{
    type Value = Matrix<T, R, C>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "a {}x{} matrix", R, C)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let size_expected = R * C;

        if let Some(size_hint) = seq.size_hint() {
            if size_hint != size_expected {
                return Err(A::Error::invalid_length(size_hint, &self));
            }
        }

        let mut elements = Vec::with_capacity(size_expected);
        while let Some(element) = seq.next_element()? {
            elements.push(element);
        }
        if elements.len() != size_expected {
            return Err(A::Error::invalid_length(elements.len(), &self));
        }

        let mut elements = elements.into_iter();
        let mut rows = Vec::with_capacity(R);
        for _ in 0..R {
            let row: Vec<T> = elements.by_ref().take(C).collect();
            rows.push(
                row.try_into()
                    .map_err(|_| A::Error::custom("matrix row length mismatch"))?,
            );
        }
        let data: [[T; C]; R] = rows
            .try_into()
            .map_err(|_| A::Error::custom("matrix row count mismatch"))?;

        Ok(Matrix::from_data(data))
    }
}
