//! Admin property form: normalisation and validation before persistence.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::slug::generate_slug;

pub const DEFAULT_CITY: &str = "São Paulo";
pub const DEFAULT_STATE: &str = "SP";

/// Amenity tags offered by the admin form and the public filters.
pub const AVAILABLE_FEATURES: [&str; 25] = [
    "Academia",
    "Elevador",
    "Quadra esportiva",
    "Churrasqueira",
    "Piscina",
    "Salão de Festas",
    "Coworking",
    "Piscina coberta",
    "Sauna",
    "Playground",
    "Portaria 24h",
    "Garagem coberta",
    "Área gourmet",
    "Jardim",
    "Varanda",
    "Ar condicionado",
    "Mobiliado",
    "Semi-mobiliado",
    "Pet friendly",
    "Bicicletário",
    "Lavanderia",
    "Depósito",
    "Terraço",
    "Vista para o mar",
    "Vista para a cidade",
];

/// Field name to error message.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Body of the create and update property endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PropertyForm {
    #[schema(example = "Residencial Jardins")]
    pub titulo: String,
    /// Generated from `titulo` when left blank
    #[schema(example = "residencial-jardins")]
    pub slug: String,
    #[schema(example = "Apartamentos de 2 e 3 dormitórios")]
    pub titulo_descricao: String,
    pub descricao: Option<String>,
    #[schema(example = 850000.0)]
    pub valor: Option<f64>,
    pub valor_condominio: Option<f64>,
    #[schema(example = "Jardins")]
    pub bairro: String,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub endereco: Option<String>,
    pub texto_localizacao: Option<String>,
    #[schema(example = "45 a 80 m²")]
    pub area_texto: String,
    pub areas_disponiveis: Vec<f64>,
    #[schema(example = "Lançamento")]
    pub status_empreendimento: String,
    pub tipo_imovel: Vec<String>,
    pub caracteristicas: Vec<String>,
    pub quartos: Vec<String>,
    pub banheiros: Vec<String>,
    pub vagas: Vec<String>,
    pub destaque: bool,
    pub home: bool,
    pub ordem: i32,
    pub iframe_mapa: String,
    pub video_url: Option<String>,
}

impl PropertyForm {
    /// Trims every field, fills defaults, derives the slug from the title
    /// when blank (canonicalising a typed one) and checks required fields.
    /// Returns every failing field at once.
    pub fn normalize(self) -> Result<PropertyForm, FieldErrors> {
        let mut errors = FieldErrors::new();

        let titulo = self.titulo.trim().to_string();
        let slug = match self.slug.trim() {
            "" => generate_slug(&titulo),
            provided => generate_slug(provided),
        };

        let form = PropertyForm {
            slug,
            titulo_descricao: self.titulo_descricao.trim().to_string(),
            descricao: non_empty(self.descricao),
            valor: self.valor,
            valor_condominio: self.valor_condominio,
            bairro: self.bairro.trim().to_string(),
            cidade: non_empty(self.cidade).or_else(|| Some(DEFAULT_CITY.to_string())),
            estado: non_empty(self.estado).or_else(|| Some(DEFAULT_STATE.to_string())),
            endereco: non_empty(self.endereco),
            texto_localizacao: non_empty(self.texto_localizacao),
            area_texto: self.area_texto.trim().to_string(),
            areas_disponiveis: self
                .areas_disponiveis
                .into_iter()
                .filter(|area| area.is_finite() && *area > 0.0)
                .collect(),
            status_empreendimento: self.status_empreendimento.trim().to_string(),
            tipo_imovel: clean_tags(self.tipo_imovel),
            caracteristicas: clean_tags(self.caracteristicas),
            quartos: clean_tags(self.quartos),
            banheiros: clean_tags(self.banheiros),
            vagas: clean_tags(self.vagas),
            destaque: self.destaque,
            home: self.home,
            ordem: self.ordem,
            iframe_mapa: self.iframe_mapa.trim().to_string(),
            video_url: non_empty(self.video_url),
            titulo,
        };

        let required = [
            ("titulo", form.titulo.is_empty()),
            ("titulo_descricao", form.titulo_descricao.is_empty()),
            ("bairro", form.bairro.is_empty()),
            ("area_texto", form.area_texto.is_empty()),
            ("iframe_mapa", form.iframe_mapa.is_empty()),
        ];
        for (field, missing) in required {
            if missing {
                errors.insert(field, format!("{field} is required"));
            }
        }

        for (field, tags) in [
            ("quartos", &form.quartos),
            ("banheiros", &form.banheiros),
            ("vagas", &form.vagas),
        ] {
            if tags.is_empty() {
                errors.insert(field, format!("{field} needs at least one option"));
            }
        }

        match form.valor {
            None => {
                errors.insert("valor", "valor is required".to_string());
            }
            Some(valor) if !valor.is_finite() || valor < 0.0 => {
                errors.insert("valor", "valor must be a non-negative number".to_string());
            }
            Some(_) => {}
        }

        if let Some(condominio) = form.valor_condominio
            && (!condominio.is_finite() || condominio < 0.0)
        {
            errors.insert(
                "valor_condominio",
                "valor_condominio must be a non-negative number".to_string(),
            );
        }

        if form.slug.is_empty() {
            errors.insert("slug", "slug is required".to_string());
        }

        if let Some(ref video_url) = form.video_url {
            let valid = url::Url::parse(video_url)
                .map(|url| matches!(url.scheme(), "http" | "https"))
                .unwrap_or(false);
            if !valid {
                errors.insert("video_url", "video_url must be an http(s) URL".to_string());
            }
        }

        if errors.is_empty() {
            Ok(form)
        } else {
            Err(errors)
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trim, drop blanks and duplicates, keep first-seen order.
fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !cleaned.iter().any(|seen| seen == tag) {
            cleaned.push(tag.to_string());
        }
    }
    cleaned
}
