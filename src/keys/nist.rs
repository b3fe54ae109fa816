//! SEC1 handling for the NIST prime curves, one module per curve.

macro_rules! nist_curve {
    ($module:ident, $compressed_len:expr, $coordinate_len:expr) => {
        pub(crate) mod $module {
            use ::$module::{elliptic_curve::sec1::ToEncodedPoint, PublicKey};

            use crate::{Error, Result};

            fn decode(bytes: &[u8]) -> Result<PublicKey> {
                PublicKey::from_sec1_bytes(bytes).map_err(|_| {
                    Error::InvalidKeyEncoding(format!(
                        "not a valid {} point",
                        stringify!($module)
                    ))
                })
            }

            /// Accepts compressed points only.
            pub(crate) fn validate(bytes: &[u8]) -> Result<()> {
                if bytes.len() != $compressed_len || !matches!(bytes[0], 0x02 | 0x03) {
                    return Err(Error::InvalidKeyEncoding(format!(
                        "{} key must be a {} byte compressed point",
                        stringify!($module),
                        $compressed_len
                    )));
                }
                decode(bytes).map(|_| ())
            }

            pub(crate) fn coordinates(compressed: &[u8]) -> Result<(Vec<u8>, Vec<u8>)> {
                let point = decode(compressed)?.to_encoded_point(false);
                match (point.x(), point.y()) {
                    (Some(x), Some(y)) => Ok((x.to_vec(), y.to_vec())),
                    _ => Err(Error::InvalidKeyEncoding("point at infinity".into())),
                }
            }

            pub(crate) fn compress(x: &[u8], y: &[u8]) -> Result<Vec<u8>> {
                if x.len() != $coordinate_len || y.len() != $coordinate_len {
                    return Err(Error::InvalidKeyEncoding(format!(
                        "{} coordinates must be {} bytes",
                        stringify!($module),
                        $coordinate_len
                    )));
                }
                let mut uncompressed = Vec::with_capacity(1 + 2 * $coordinate_len);
                uncompressed.push(0x04);
                uncompressed.extend_from_slice(x);
                uncompressed.extend_from_slice(y);
                Ok(decode(&uncompressed)?
                    .to_encoded_point(true)
                    .as_bytes()
                    .to_vec())
            }
        }
    };
}

nist_curve!(p256, 33, 32);
nist_curve!(p384, 49, 48);
nist_curve!(p521, 67, 66);
