use crate::prompt::common::global_context;

/// Categories and the subcategories the classifier may choose from.
pub const CATEGORY_TREE: &[(&str, &[&str])] = &[
    (
        "Política",
        &[
            "Presidente",
            "Congreso",
            "Gobierno Regional",
            "Gobierno Local",
            "Gabinete Ministerial",
            "Elecciones",
            "Partidos Políticos",
        ],
    ),
    (
        "Economía",
        &[
            "Inflación y Precios",
            "Empleo",
            "Comercio Exterior",
            "Sector Minero",
            "Banca y Finanzas",
            "Empresas",
        ],
    ),
    (
        "Deportes",
        &[
            "Fútbol Nacional",
            "Fútbol Internacional",
            "Selección Peruana",
            "Otros Deportes",
        ],
    ),
    (
        "Espectáculos",
        &["Farándula", "Música", "Cine y TV", "Concursos de Belleza"],
    ),
    ("Cultura", &["Arte", "Literatura", "Patrimonio", "Festivales"]),
    (
        "Internacional",
        &[
            "América Latina",
            "Estados Unidos",
            "Europa",
            "Asia",
            "Conflictos",
            "Diplomacia",
        ],
    ),
    (
        "Seguridad",
        &[
            "Criminalidad",
            "Narcotráfico",
            "Desastres Naturales",
            "Accidentes",
        ],
    ),
    ("Sociedad", &["Comunidad", "Transporte", "Servicios Públicos"]),
    ("Salud", &["Sistema de Salud", "Epidemias", "Medicinas"]),
    ("Educación", &["Universidades", "Colegios", "Reforma Educativa"]),
    ("Tecnología", &["Innovación", "Startups", "Telecomunicaciones"]),
    ("Medio Ambiente", &["Clima", "Contaminación", "Biodiversidad"]),
];

/// Prompt asking for the four level hierarchy of an article.
pub fn categorization_prompt(title: &str, description: &str, base_category: &str) -> String {
    let description: String = description.chars().take(500).collect();

    let tree = CATEGORY_TREE
        .iter()
        .map(|(category, subcategories)| format!("- {}: {}", category, subcategories.join(", ")))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
{context}

ARTICLE (FOR CATEGORIZATION):
----------
TITLE: {title}
DESCRIPTION: {description}
INITIAL CATEGORY: {base_category}
----------

TASK: Place this article in a four level hierarchy.

LEVELS:
1. categoria: the broadest level, one of the categories below
2. subcategoria: one of the subcategories listed for that category
3. tema: the central entity of the article (person, institution, event)
4. subtema: the specific aspect of that entity, or "General" if there is none

VALID CATEGORIES AND SUBCATEGORIES:
{tree}

If unsure, keep the initial category and use "General" for the lower levels.

RETURN FORMAT (JSON):
{{
  "categoria": "Política",
  "subcategoria": "Presidente",
  "tema": "Dina Boluarte",
  "subtema": "Controversias"
}}
"#,
        context = global_context(None),
    )
}
