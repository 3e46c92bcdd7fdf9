use anyhow::{anyhow, Result};

use crate::record::{MappingRecord, ShuffleResult, WordCount};

/// Normaliza un fragmento de texto: quita la puntuación ASCII y pasa a minúsculas.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
}

/// map: texto -> un registro {palabra: 1} por cada token, en orden de aparición.
pub fn map_text(text: &str) -> Vec<MappingRecord> {
    normalize(text)
        .split_whitespace()
        .map(MappingRecord::new)
        .collect()
}

/// shuffle: agrupa los registros por clave conservando el orden de llegada de los valores.
pub fn shuffle_records(records: Vec<MappingRecord>) -> ShuffleResult {
    let mut out = ShuffleResult::new();
    for rec in records {
        let (key, count) = rec.into_parts();
        out.entry(key).or_default().push(count);
    }
    out
}

/// reduce: suma los valores de cada clave. Una suma que no entra en u64 es error.
pub fn reduce_values(shuffled: ShuffleResult) -> Result<WordCount> {
    shuffled
        .into_iter()
        .map(|(key, values)| -> Result<(String, u64)> {
            let total = values
                .iter()
                .try_fold(0u64, |acc, v| acc.checked_add(*v))
                .ok_or_else(|| anyhow!("overflow sumando los valores de {key:?}"))?;
            Ok((key, total))
        })
        .collect()
}

/// Pipeline completo en un solo proceso (útil para comparar contra el distribuido).
/// Cada token suma 1, así que satura en vez de fallar.
pub fn count_words_local(text: &str) -> WordCount {
    let mut out = WordCount::new();
    for rec in map_text(text) {
        let (key, count) = rec.into_parts();
        let total = out.entry(key).or_default();
        *total = total.saturating_add(count);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Caso feliz: texto con mayúsculas, signos y varios espacios.
    #[test]
    fn map_text_normaliza_y_emite_un_registro_por_token() {
        let recs = map_text("Hola hola, mundo!!\n  mundo   don't");

        let keys: Vec<&str> = recs.iter().map(|r| r.key()).collect();
        assert_eq!(keys, vec!["hola", "hola", "mundo", "mundo", "dont"]);
        assert!(recs.iter().all(|r| r.count() == 1));
    }

    #[test]
    fn map_text_con_texto_vacio_o_solo_signos_no_emite_nada() {
        assert!(map_text("").is_empty());
        assert!(map_text(" ... !!! \n").is_empty());
    }

    #[test]
    fn shuffle_records_agrupa_por_clave() {
        let recs = vec![
            MappingRecord::new("lorem"),
            MappingRecord::new("ipsum"),
            MappingRecord::with_count("lorem", 2),
        ];

        let out = shuffle_records(recs);

        assert_eq!(out.len(), 2);
        assert_eq!(out["lorem"], vec![1, 2]);
        assert_eq!(out["ipsum"], vec![1]);
    }

    #[test]
    fn reduce_values_suma_por_clave() {
        let mut shuffled = ShuffleResult::new();
        shuffled.insert("lorem".to_string(), vec![1, 1, 1]);
        shuffled.insert("sit".to_string(), vec![1]);
        shuffled.insert("vacio".to_string(), vec![]);

        let wc = reduce_values(shuffled).unwrap();

        assert_eq!(wc["lorem"], 3);
        assert_eq!(wc["sit"], 1);
        assert_eq!(wc["vacio"], 0);
    }

    #[test]
    fn reduce_values_con_overflow_es_error() {
        let mut shuffled = ShuffleResult::new();
        shuffled.insert("lorem".to_string(), vec![u64::MAX, 1]);

        assert!(reduce_values(shuffled).is_err());

        let mut justo = ShuffleResult::new();
        justo.insert("lorem".to_string(), vec![u64::MAX - 1, 1]);
        assert_eq!(reduce_values(justo).unwrap()["lorem"], u64::MAX);
    }

    #[test]
    fn count_words_local_ejemplo_lorem_ipsum() {
        let wc = count_words_local("lorem lorem\nlorem ipsum\nipsum sit");

        let expected: WordCount = [("ipsum", 2), ("lorem", 3), ("sit", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(wc, expected);
    }
}
