use crate::FragmenterError;

/// A disjoint slice of a remote table.
///
/// `metadata` is opaque to everything but the fragmenter that produced it; workers hand it
/// back unchanged to narrow their query to this slice.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Table or data source identifier, copied verbatim from the request.
    pub source_name: String,
    /// Serialized fragment bounds. Empty means the whole table.
    pub metadata: Vec<u8>,
    /// Reserved, always empty.
    pub user_data: Vec<u8>,
    /// Hosts that can serve this fragment.
    pub replicas: Vec<String>,
}

impl Fragment {
    /// Create a new fragment with no replicas assigned yet.
    ///
    /// # Arguments
    ///
    /// * `source_name` - Table the fragment belongs to.
    /// * `metadata` - Serialized bounds of the fragment.
    pub fn new(source_name: &str, metadata: Vec<u8>) -> Self {
        Self {
            source_name: source_name.to_string(),
            metadata,
            user_data: Vec::new(),
            replicas: Vec::new(),
        }
    }

    /// Set the hosts that serve this fragment.
    pub fn set_replicas(&mut self, replicas: Vec<String>) {
        self.replicas = replicas;
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, FragmenterError> {
        Ok(serde_cbor::to_vec(&self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FragmenterError> {
        Ok(serde_cbor::from_slice(bytes)?)
    }
}

/// Statistics over the fragments of a table. The JDBC fragmenter never produces these.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct FragmentsStats {
    /// Number of fragments.
    pub fragment_count: u64,
    /// Size in bytes of the first fragment.
    pub first_fragment_size: u64,
    /// Total size in bytes.
    pub total_size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_fragment() {
        let mut fragment = Fragment::new("sales", vec![1, 2, 3]);
        assert_eq!("sales", fragment.source_name);
        assert!(fragment.user_data.is_empty());
        assert!(fragment.replicas.is_empty());
        fragment.set_replicas(vec![String::from("10.0.0.7")]);
        assert_eq!(vec![String::from("10.0.0.7")], fragment.replicas);
    }

    #[test]
    fn test_fragment_bytes() {
        let mut fragment = Fragment::new("sales", b"excellent".to_vec());
        fragment.set_replicas(vec![String::from("10.0.0.7")]);
        let bytes = fragment.to_bytes().unwrap();
        let check_fragment = Fragment::from_bytes(&bytes).unwrap();
        assert_eq!(fragment, check_fragment);
    }

    #[test]
    fn test_fragment_from_garbage() {
        let res = Fragment::from_bytes(&[0xff, 0x00, 0x13]);
        assert!(matches!(res, Err(FragmenterError::SerializationError(_))));
    }
}
