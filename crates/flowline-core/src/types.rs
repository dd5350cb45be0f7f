use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Represents a structured payload flowing through the engine
///
/// This is a wrapper around a JSON value with some helper methods
/// for working with step inputs and outputs in different formats.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DataPacket {
    /// The inner JSON value
    pub value: serde_json::Value,
}

impl DataPacket {
    /// Create a new data packet from a JSON value
    #[inline]
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Create a null data packet
    #[inline]
    pub fn null() -> Self {
        Self {
            value: serde_json::Value::Null,
        }
    }

    /// Get the inner JSON value
    #[inline]
    pub fn as_value(&self) -> &serde_json::Value {
        &self.value
    }

    /// Take ownership of the inner JSON value
    #[inline]
    pub fn into_value(self) -> serde_json::Value {
        self.value
    }

    /// Check if the data packet is null
    #[inline]
    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    /// Try to convert the data packet to a string
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.value.as_str()
    }

    /// Try to convert the data packet to a boolean
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        self.value.as_bool()
    }

    /// Try to convert the data packet to an object
    #[inline]
    pub fn as_object(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        self.value.as_object()
    }

    /// Try to convert the data packet to an array
    #[inline]
    pub fn as_array(&self) -> Option<&Vec<serde_json::Value>> {
        self.value.as_array()
    }

    /// Try to convert the data packet to a specific type
    pub fn to<T>(&self) -> Result<T, serde_json::Error>
    where
        T: DeserializeOwned,
    {
        serde_json::from_value(self.value.clone())
    }

    /// Create a data packet from a serializable value
    pub fn from<T>(value: &T) -> Result<Self, serde_json::Error>
    where
        T: Serialize,
    {
        Ok(Self::new(serde_json::to_value(value)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_packet_creation() {
        let packet = DataPacket::new(json!({"name": "test"}));
        assert_eq!(packet.as_value()["name"], "test");
    }

    #[test]
    fn test_data_packet_null() {
        let packet = DataPacket::null();
        assert!(packet.is_null());
    }

    #[test]
    fn test_data_packet_serialization() {
        let original = DataPacket::new(json!({"complex": {"nested": ["array", 123]}}));
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: DataPacket = serde_json::from_str(&serialized).unwrap();
        assert_eq!(*original.as_value(), *deserialized.as_value());
    }

    #[test]
    fn test_data_packet_as_object_and_array() {
        let packet = DataPacket::new(json!({"rows": [1, 2, 3]}));
        let obj = packet.as_object().unwrap();
        assert_eq!(obj.get("rows").unwrap().as_array().unwrap().len(), 3);

        let non_obj = DataPacket::new(json!("not an object"));
        assert!(non_obj.as_object().is_none());
        assert!(non_obj.as_array().is_none());
        assert_eq!(non_obj.as_str().unwrap(), "not an object");
    }

    #[test]
    fn test_data_packet_to() {
        #[derive(Deserialize, PartialEq, Debug)]
        struct TestStruct {
            name: String,
            age: u32,
        }

        let packet = DataPacket::new(json!({
            "name": "Test User",
            "age": 30
        }));

        let test_struct: TestStruct = packet.to().unwrap();
        assert_eq!(test_struct.name, "Test User");
        assert_eq!(test_struct.age, 30);
    }

    #[test]
    fn test_data_packet_from() {
        #[derive(Serialize)]
        struct TestStruct {
            id: u32,
            description: String,
        }

        let test_data = TestStruct {
            id: 123,
            description: "test description".to_string(),
        };

        let packet = DataPacket::from(&test_data).unwrap();
        assert_eq!(packet.as_value()["id"], 123);
        assert_eq!(packet.as_value()["description"], "test description");
    }
}
