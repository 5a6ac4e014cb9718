use std::fmt::{Display, Write as _};

use crate::workflows::intake::domain::{Applicable, SubmissionRecord};

const NOT_INFORMED: &str = "Não informado";

fn measure<T: Display>(value: &Applicable<T>, unit: &str) -> String {
    match value {
        Applicable::Value(value) => format!("{value} {unit}"),
        Applicable::NotApplicable => "Não se aplica".to_string(),
        Applicable::Unset => NOT_INFORMED.to_string(),
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Renders the PTAM drafting instructions for `record`.
pub fn build_prompt(record: &SubmissionRecord) -> String {
    let applicant = &record.applicant;
    let address = &record.address;
    let property = &record.property;
    let documentation = &record.documentation;

    let state = address.state.map(|state| state.code()).unwrap_or_default();
    let location = format!(
        "{}, nº {}, Bairro {}, {} - {}, CEP: {}",
        address.street, address.number, address.neighborhood, address.city, state, address.postal_code
    );
    let documents = if documentation.available.is_empty() {
        "Nenhum".to_string()
    } else {
        documentation
            .available
            .iter()
            .map(|kind| kind.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let document_status = documentation
        .status
        .map(|status| status.label())
        .unwrap_or(NOT_INFORMED);
    let condominium = match &record.condominium {
        Applicable::Value(name) => name.as_str(),
        _ => "N/A",
    };
    let photo_count = record.filled_photos().count();
    let photos = if photo_count == 0 {
        "Nenhuma foto fornecida".to_string()
    } else {
        format!("{photo_count} fotos fornecidas (anexadas a esta solicitação)")
    };

    let mut prompt = String::new();
    writeln!(
        &mut prompt,
        "**Tarefa:** Atue como um avaliador de imóveis profissional e experiente, filiado ao CRECI e com registro no CNAI. Elabore um Parecer Técnico de Avaliação Mercadológica (PTAM) conciso e bem-estruturado com base nos dados fornecidos do imóvel."
    )
    .expect("write task");
    prompt.push('\n');

    writeln!(&mut prompt, "**Dados do Imóvel:**").expect("write data header");
    writeln!(&mut prompt, "- **Nome do Cliente:** {}", applicant.full_name)
        .expect("write client");
    writeln!(&mut prompt, "- **Solicitante:** {}", applicant.role.label())
        .expect("write role");
    writeln!(&mut prompt, "- **Endereço:** {location}").expect("write address");
    writeln!(&mut prompt, "- **Tipo de Imóvel:** {}", property.kind.label())
        .expect("write property type");
    writeln!(
        &mut prompt,
        "- **Área do Terreno:** {}",
        measure(&property.land_area, "m²")
    )
    .expect("write land area");
    writeln!(
        &mut prompt,
        "- **Área Construída:** {}",
        measure(&property.built_area, "m²")
    )
    .expect("write built area");
    writeln!(
        &mut prompt,
        "- **Idade da Construção:** {}",
        measure(&property.construction_age, "anos")
    )
    .expect("write age");
    writeln!(
        &mut prompt,
        "- **Descrição da Conservação:** {}",
        property.condition_description
    )
    .expect("write condition");
    writeln!(&mut prompt, "- **Documentos Apresentados:** {documents}").expect("write documents");
    writeln!(&mut prompt, "- **Situação Documental:** {document_status}")
        .expect("write document status");
    writeln!(
        &mut prompt,
        "- **Objetivo da Avaliação:** {}",
        documentation.objective.label()
    )
    .expect("write objective");
    writeln!(&mut prompt, "- **Ocupação:** {}", record.occupancy.label())
        .expect("write occupancy");
    writeln!(&mut prompt, "- **Condomínio:** {condominium}").expect("write condominium");
    writeln!(&mut prompt, "- **Fotos:** {photos}").expect("write photos");
    writeln!(
        &mut prompt,
        "- **Detalhes Adicionais:** {}",
        or_default(&record.additional_details, "Nenhum")
    )
    .expect("write details");
    prompt.push('\n');

    writeln!(
        &mut prompt,
        "**Estrutura do Parecer:** Siga rigorosamente a estrutura abaixo, utilizando Markdown (títulos, negrito e listas)."
    )
    .expect("write structure");
    writeln!(&mut prompt, "\n---\n").expect("write rule");
    writeln!(
        &mut prompt,
        "### **PARECER TÉCNICO DE AVALIAÇÃO MERCADOLÓGICA (PTAM)**\n"
    )
    .expect("write title");

    writeln!(&mut prompt, "**1. SOLICITANTE**").expect("write section 1");
    writeln!(&mut prompt, "   - **Nome:** {}", applicant.full_name).expect("write name");
    writeln!(&mut prompt, "   - **Qualificação:** {}\n", applicant.role.label())
        .expect("write qualification");

    writeln!(&mut prompt, "**2. OBJETIVO**").expect("write section 2");
    writeln!(
        &mut prompt,
        "   - O presente parecer tem como objetivo a determinação do valor de mercado do imóvel descrito abaixo, para fins de **{}**.\n",
        documentation.objective.label()
    )
    .expect("write objective section");

    writeln!(&mut prompt, "**3. IDENTIFICAÇÃO E CARACTERIZAÇÃO DO IMÓVEL**")
        .expect("write section 3");
    writeln!(&mut prompt, "   - **Endereço:** {location}.").expect("write location");
    writeln!(&mut prompt, "   - **Tipo de Imóvel:** {}.", property.kind.label())
        .expect("write kind");
    writeln!(
        &mut prompt,
        "   - **Medidas:** Área do Terreno: {}. Área Construída: {}.",
        measure(&property.land_area, "m²"),
        measure(&property.built_area, "m²")
    )
    .expect("write measures");
    writeln!(
        &mut prompt,
        "   - **Estado de Conservação:** [Analise a descrição \"{}\" e classifique como: Novo, Bom, Regular, Mau, Péssimo].\n",
        property.condition_description
    )
    .expect("write conservation");

    writeln!(&mut prompt, "**4. ANÁLISE DO MERCADO E METODOLOGIA**").expect("write section 4");
    writeln!(
        &mut prompt,
        "   - **Metodologia:** Método Comparativo Direto de Dados de Mercado, conforme a NBR 14.653 da ABNT."
    )
    .expect("write methodology");
    writeln!(
        &mut prompt,
        "   - **Análise da Região:** O imóvel está localizado no bairro {}, uma área [descreva as características da região].",
        address.neighborhood
    )
    .expect("write region");
    writeln!(
        &mut prompt,
        "   - **Pesquisa de Mercado:** [Simule uma breve pesquisa com imóveis semelhantes, faixa de valores e média do m² na região].\n"
    )
    .expect("write market research");

    writeln!(&mut prompt, "**5. CONCLUSÃO E VALOR DE MERCADO**").expect("write section 5");
    writeln!(
        &mut prompt,
        "   - **VALOR SUGERIDO: R$ [Estime um valor realista com base em área, localização e condição].**"
    )
    .expect("write value");
    writeln!(
        &mut prompt,
        "   - **VALOR POR EXTENSO: ([Escreva o valor por extenso]).**\n"
    )
    .expect("write value in words");

    writeln!(&mut prompt, "**6. OBSERVAÇÕES FINAIS**").expect("write section 6");
    writeln!(
        &mut prompt,
        "   - Este parecer é válido por 90 dias, podendo sofrer alterações devido a flutuações do mercado imobiliário."
    )
    .expect("write validity");
    writeln!(
        &mut prompt,
        "   - A situação documental, conforme informado pelo solicitante, é: \"{document_status}\". Recomenda-se uma análise jurídica completa da documentação."
    )
    .expect("write documentation remark");
    writeln!(
        &mut prompt,
        "   - O imóvel encontra-se **{}**.",
        record.occupancy.label()
    )
    .expect("write occupancy remark");
    writeln!(&mut prompt, "\n---\n").expect("write rule");

    writeln!(&mut prompt, "**Instruções Adicionais:**").expect("write instructions");
    writeln!(&mut prompt, "- Seja objetivo e técnico.").expect("write tone");
    writeln!(&mut prompt, "- **NÃO** inclua informações sobre você (a IA).")
        .expect("write self rule");
    writeln!(
        &mut prompt,
        "- **NÃO** adicione notas de rodapé ou explicações fora da estrutura solicitada."
    )
    .expect("write footnote rule");
    writeln!(
        &mut prompt,
        "- Preencha as seções entre colchetes **[...]** com análises plausíveis baseadas nos dados de entrada e nas fotos anexadas."
    )
    .expect("write bracket rule");

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::{
        DocumentKind, DocumentStatus, Objective, Occupancy, StateCode,
    };

    fn record() -> SubmissionRecord {
        let mut record = SubmissionRecord::default();
        record.applicant.full_name = "Maria Souza".to_string();
        record.address.street = "Av. Paulista".to_string();
        record.address.number = "1000".to_string();
        record.address.neighborhood = "Bela Vista".to_string();
        record.address.city = "São Paulo".to_string();
        record.address.state = Some(StateCode::Sp);
        record.address.postal_code = "01310-100".to_string();
        record.property.land_area = Applicable::Value(250.0);
        record.property.built_area = Applicable::NotApplicable;
        record.documentation.available.insert(DocumentKind::PropertyRegistration);
        record.documentation.status = Some(DocumentStatus::Regular);
        record.documentation.objective = Objective::EstateDivision;
        record.occupancy = Occupancy::Occupied;
        record
    }

    #[test]
    fn prompt_lists_the_six_report_sections() {
        let prompt = build_prompt(&record());
        for heading in [
            "**1. SOLICITANTE**",
            "**2. OBJETIVO**",
            "**3. IDENTIFICAÇÃO E CARACTERIZAÇÃO DO IMÓVEL**",
            "**4. ANÁLISE DO MERCADO E METODOLOGIA**",
            "**5. CONCLUSÃO E VALOR DE MERCADO**",
            "**6. OBSERVAÇÕES FINAIS**",
        ] {
            assert!(prompt.contains(heading), "missing {heading}");
        }
    }

    #[test]
    fn prompt_renders_record_values_with_labels() {
        let prompt = build_prompt(&record());
        assert!(prompt.contains("Av. Paulista, nº 1000, Bairro Bela Vista, São Paulo - SP, CEP: 01310-100"));
        assert!(prompt.contains("Área do Terreno:** 250 m²"));
        assert!(prompt.contains("Área Construída:** Não se aplica"));
        assert!(prompt.contains("Idade da Construção:** Não informado"));
        assert!(prompt.contains(DocumentKind::PropertyRegistration.label()));
        assert!(prompt.contains(Objective::EstateDivision.label()));
        assert!(prompt.contains("Nenhuma foto fornecida"));
        assert!(prompt.contains("Detalhes Adicionais:** Nenhum"));
    }
}
