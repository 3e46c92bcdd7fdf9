use serde::{
    de::{self, MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use std::{collections::BTreeMap, fmt};

/// Salida del shuffle: palabra -> lista de valores en el orden en que llegaron.
pub type ShuffleResult = BTreeMap<String, Vec<u64>>;

/// Resultado final: palabra -> total.
pub type WordCount = BTreeMap<String, u64>;

/// Registro emitido por el map: una sola clave con su conteo (siempre 1).
///
/// En el cable viaja como un objeto JSON de un único miembro: `{"lorem":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingRecord {
    key: String,
    count: u64,
}

impl MappingRecord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: 1,
        }
    }

    pub fn with_count(key: impl Into<String>, count: u64) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn into_parts(self) -> (String, u64) {
        (self.key, self.count)
    }
}

impl Serialize for MappingRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.key, &self.count)?;
        map.end()
    }
}

struct MappingRecordVisitor;

impl<'de> Visitor<'de> for MappingRecordVisitor {
    type Value = MappingRecord;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("un objeto con exactamente una clave")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let (key, count) = access
            .next_entry::<String, u64>()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;

        if access.next_key::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(2, &self));
        }

        Ok(MappingRecord { key, count })
    }
}

impl<'de> Deserialize<'de> for MappingRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(MappingRecordVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_record_viaja_como_objeto_de_una_clave() {
        let rec = MappingRecord::new("lorem");
        assert_eq!(serde_json::to_string(&rec).unwrap(), r#"{"lorem":1}"#);

        let recs: Vec<MappingRecord> =
            serde_json::from_str(r#"[{"lorem":1},{"ipsum":1}]"#).unwrap();
        assert_eq!(recs, vec![MappingRecord::new("lorem"), MappingRecord::new("ipsum")]);
    }

    #[test]
    fn mapping_record_rechaza_objetos_vacios_o_con_varias_claves() {
        assert!(serde_json::from_str::<MappingRecord>("{}").is_err());
        assert!(serde_json::from_str::<MappingRecord>(r#"{"a":1,"b":1}"#).is_err());
        assert!(serde_json::from_str::<MappingRecord>(r#"{"a":-1}"#).is_err());
        assert!(serde_json::from_str::<MappingRecord>(r#"["a",1]"#).is_err());
    }
}
