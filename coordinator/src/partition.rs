use crate::error::{PipelineError, Result};

/// Parte `content` en `n` trozos contiguos por cantidad de líneas.
///
/// Las primeras `total % n` particiones llevan una línea extra. Si hay menos
/// líneas que particiones, las últimas quedan vacías (sin líneas). Unir con
/// `\n` las particiones que recibieron líneas devuelve exactamente el contenido.
pub fn partition_content(content: &str, n: usize) -> Result<Vec<String>> {
    if n == 0 {
        return Err(PipelineError::Config(
            "no se puede particionar en 0 partes".to_string(),
        ));
    }

    let lines: Vec<&str> = content.split('\n').collect();
    let base = lines.len() / n;
    let remainder = lines.len() % n;

    let mut parts = Vec::with_capacity(n);
    let mut index = 0;
    for i in 0..n {
        let size = if i < remainder { base + 1 } else { base };
        parts.push(lines[index..index + size].join("\n"));
        index += size;
    }

    Ok(parts)
}
