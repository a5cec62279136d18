//! Built-in notification template catalog

use super::model::NotificationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendedChannel {
    CartaRegistrada,
    Email,
    Whatsapp,
    Cartorio,
}

#[derive(Debug, Clone, Copy)]
pub struct NotificationTemplate {
    pub notification_type: NotificationType,
    pub label: &'static str,
    pub short_description: &'static str,
    pub default_title: &'static str,
    pub default_body: &'static str,
    pub recommended_channel: RecommendedChannel,
    pub tags: &'static [&'static str],
}

pub fn find_template(notification_type: NotificationType) -> Option<&'static NotificationTemplate> {
    NOTIFICATION_TEMPLATES
        .iter()
        .find(|t| t.notification_type == notification_type)
}

pub static NOTIFICATION_TEMPLATES: &[NotificationTemplate] = &[
    NotificationTemplate {
        notification_type: NotificationType::CobrancaAluguelEmAtraso,
        label: "Cobrança de aluguel em atraso",
        short_description: "Lembrete formal sobre parcela vencida com prazo curto para regularização.",
        default_title: "Cobrança de aluguel em atraso",
        default_body: r#"Prezado(a) {nome_locatario},

Conforme contrato de locação do imóvel situado em {endereco_imovel}, identificamos o atraso no pagamento do aluguel com vencimento em {vencimento}.

Solicitamos a regularização em até {prazo_dias} dias, sob pena de incidência de multa e demais encargos previstos em contrato.

Caso já tenha realizado o pagamento, desconsidere este aviso e, por gentileza, encaminhe o comprovante."#,
        recommended_channel: RecommendedChannel::Whatsapp,
        tags: &["cobranca", "aluguel", "inadimplencia"],
    },
    NotificationTemplate {
        notification_type: NotificationType::CobrancaMultiplasParcelas,
        label: "Cobrança de múltiplas parcelas",
        short_description: "Cobrança consolidada de mais de uma parcela em aberto.",
        default_title: "Regularização de parcelas em aberto",
        default_body: r#"Prezado(a) {nome_locatario},

Constatamos a existência de {quantidade_parcelas} parcelas em aberto referentes ao contrato do imóvel em {endereco_imovel}.

Para evitar protesto e rescisão contratual, solicitamos o pagamento ou a formalização de um acordo em até {prazo_dias} dias.

Estamos disponíveis para esclarecer dúvidas ou alinhar um plano de regularização."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["cobranca", "parcelas", "inadimplencia"],
    },
    NotificationTemplate {
        notification_type: NotificationType::ReajusteAnualAluguel,
        label: "Reajuste anual do aluguel",
        short_description: "Comunicação de reajuste anual conforme índice contratual.",
        default_title: "Aviso de reajuste anual do aluguel",
        default_body: r#"Prezado(a) {nome_locatario},

De acordo com a cláusula de reajuste do contrato do imóvel em {endereco_imovel}, informamos que o valor do aluguel será atualizado a partir de {data_reajuste}, utilizando o índice {indice} acumulado dos últimos 12 meses.

O novo valor mensal passará a ser de R$ {valor_reajustado}. O boleto/recibo já refletirá o reajuste na próxima competência."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["reajuste", "contrato", "indice"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoReajusteAcimaIgpm,
        label: "Aviso de reajuste acima do IGPM/IPCA",
        short_description: "Notificação quando o índice projetado supera o usual, contextualizando impacto.",
        default_title: "Comunicação de reajuste excepcional",
        default_body: r#"Prezado(a) {nome_locatario},

Informamos que, em razão da variação do índice {indice} acima do esperado, o reajuste do aluguel do imóvel em {endereco_imovel} será aplicado a partir de {data_reajuste}.

O novo valor proposto é de R$ {valor_reajustado}. Mantemos abertura para dialogar sobre eventuais ajustes ou cronograma de transição.

Caso deseje uma revisão conjunta, responda a este aviso para agendarmos."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["reajuste", "indice", "negociacao"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoEntradaVistoria,
        label: "Aviso de vistoria de entrada",
        short_description: "Confirma agendamento de vistoria inicial com orientações ao inquilino.",
        default_title: "Confirmação de vistoria de entrada",
        default_body: r#"Prezado(a) {nome_locatario},

Confirmamos a vistoria de entrada do imóvel em {endereco_imovel} para {data} às {hora}. A vistoria avaliará o estado do imóvel e registrará o checklist inicial.

Pedimos que deixe o acesso livre e, se necessário, um representante autorizado esteja presente."#,
        recommended_channel: RecommendedChannel::Whatsapp,
        tags: &["vistoria", "entrada", "checklist"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoSaidaVistoria,
        label: "Aviso de vistoria de saída",
        short_description: "Agenda vistoria final e reforça responsabilidades na devolução.",
        default_title: "Agendamento de vistoria de saída",
        default_body: r#"Prezado(a) {nome_locatario},

Agendamos a vistoria de saída do imóvel em {endereco_imovel} para {data} às {hora}. Nesta visita avaliaremos eventuais reparos, pintura e limpeza final conforme contrato.

Solicitamos que o imóvel esteja desocupado e limpo, com todas as chaves disponíveis para conferência."#,
        recommended_channel: RecommendedChannel::Whatsapp,
        tags: &["vistoria", "saida", "devolucao"],
    },
    NotificationTemplate {
        notification_type: NotificationType::NotificacaoDescumprimentoClausula,
        label: "Descumprimento de cláusula contratual",
        short_description: "Alerta formal sobre violação de cláusula e prazo para sanar.",
        default_title: "Notificação de descumprimento contratual",
        default_body: r#"Prezado(a) {nome_destinatario},

Identificamos o descumprimento da cláusula {clausula} do contrato referente ao imóvel em {endereco_imovel}.

Solicitamos a regularização em até {prazo_dias} dias, sob pena das medidas previstas em contrato e na Lei do Inquilinato, incluindo possível rescisão e cobrança de multas."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["contrato", "descumprimento", "prazo"],
    },
    NotificationTemplate {
        notification_type: NotificationType::NotificacaoObrasNaoAutorizadas,
        label: "Obras não autorizadas",
        short_description: "Exige paralisação/regularização de obras feitas sem autorização.",
        default_title: "Notificação de obras não autorizadas",
        default_body: r#"Prezado(a) {nome_locatario},

Constatamos intervenções/obras no imóvel em {endereco_imovel} sem a devida autorização prévia do locador, contrariando o contrato e o art. 23, V da Lei do Inquilinato.

Solicitamos a imediata paralisação e apresentação do escopo para análise. Caso já executadas, regularize e devolva o imóvel ao estado original em até {prazo_dias} dias."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["obra", "autorizacao", "regularizacao"],
    },
    NotificationTemplate {
        notification_type: NotificationType::NotificacaoBarulhoVizinhanca,
        label: "Perturbação por barulho",
        short_description: "Advertência sobre ruídos e convivência condominial.",
        default_title: "Advertência por barulho e convivência",
        default_body: r#"Prezado(a) {nome_locatario},

Recebemos reclamações recorrentes de ruídos no imóvel em {endereco_imovel}, em desacordo com o regulamento condominial e o dever de vizinhança.

Solicitamos ajuste imediato das condutas, mantendo silêncio nos horários de descanso e respeito às normas do condomínio. Novos episódios poderão gerar multa condominial e rescisão."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["condominio", "convivencia", "barulho"],
    },
    NotificationTemplate {
        notification_type: NotificationType::NotificacaoAnimaisCondominio,
        label: "Animais em desacordo com regras",
        short_description: "Alerta sobre animais sem autorização ou fora das regras.",
        default_title: "Notificação sobre animais no condomínio",
        default_body: r#"Prezado(a) {nome_locatario},

Foi registrada a presença de animal em desacordo com o regulamento do condomínio no imóvel em {endereco_imovel}.

Solicitamos a regularização (cadastro, vacinação, regras de circulação) ou retirada do animal em até {prazo_dias} dias para evitar multa e demais penalidades."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["animais", "condominio", "regras"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoResilicaoAntecipada,
        label: "Aviso de resilição antecipada",
        short_description: "Comunica intenção de encerrar o contrato antes do prazo.",
        default_title: "Aviso de resilição antecipada",
        default_body: r#"Prezado(a) {nome_destinatario},

Comunicamos a intenção de rescindir antecipadamente o contrato do imóvel em {endereco_imovel}, a partir de {data_rescisao}.

Solicitamos providências para cálculo de multa (se aplicável), vistoria final e devolução das chaves. Podemos alinhar datas e responsabilidades para uma transição organizada."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["rescisao", "prazo", "transicao"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoFimContrato,
        label: "Aviso de fim de contrato",
        short_description: "Recordatório do término do contrato e próximos passos.",
        default_title: "Aviso de término de contrato",
        default_body: r#"Prezado(a) {nome_destinatario},

O contrato do imóvel em {endereco_imovel} encerra-se em {data_fim}. Solicitamos manifestar interesse em renovação ou desocupação em até {prazo_manifestacao} dias.

Caso opte pela saída, alinharemos vistoria e devolução das chaves. Permanecemos à disposição."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["fim de contrato", "renovacao", "planejamento"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AvisoRenovacaoProposta,
        label: "Proposta de renovação",
        short_description: "Sugestão de renovação com novo valor e condições.",
        default_title: "Proposta de renovação contratual",
        default_body: r#"Prezado(a) {nome_locatario},

Gostaríamos de propor a renovação do contrato do imóvel em {endereco_imovel} por mais {prazo_meses} meses.

Proposta de novo valor: R$ {valor_proposto}, a vigorar a partir de {data_inicio}. Caso concorde, seguiremos com minuta para assinatura."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["renovacao", "proposta", "valor"],
    },
    NotificationTemplate {
        notification_type: NotificationType::CobrancaCondominioAtraso,
        label: "Condomínio em atraso",
        short_description: "Cobra rateio condominial pendente conforme contrato.",
        default_title: "Cobrança de condomínio em atraso",
        default_body: r#"Prezado(a) {nome_locatario},

Verificamos atraso no repasse das cotas condominiais referentes ao imóvel em {endereco_imovel}, competência {competencia}.

Solicitamos pagamento imediato para evitar multa condominial e eventuais restrições de uso das áreas comuns."#,
        recommended_channel: RecommendedChannel::Email,
        tags: &["condominio", "cobranca", "repasse"],
    },
    NotificationTemplate {
        notification_type: NotificationType::CobrancaIptuAtraso,
        label: "IPTU em atraso",
        short_description: "Cobra tributo municipal pendente conforme contrato.",
        default_title: "Cobrança de IPTU em atraso",
        default_body: r#"Prezado(a) {nome_locatario},

Conforme contrato, o IPTU do imóvel em {endereco_imovel}, referente ao exercício {ano}, encontra-se em aberto.

Solicitamos quitação em até {prazo_dias} dias para evitar atualização monetária, juros e inscrição em dívida ativa."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["iptu", "tributo", "cobranca"],
    },
    NotificationTemplate {
        notification_type: NotificationType::AdvertenciaFormal,
        label: "Advertência formal",
        short_description: "Comunica infração e alerta sobre reincidência.",
        default_title: "Advertência formal",
        default_body: r#"Prezado(a) {nome_destinatario},

Registramos a infração {descricao_infracao} no contexto do contrato do imóvel em {endereco_imovel}.

Esta é uma advertência formal. Reincidências poderão resultar em multa, restrições ou rescisão contratual, conforme cláusulas pactuadas."#,
        recommended_channel: RecommendedChannel::CartaRegistrada,
        tags: &["advertencia", "contrato", "reincidencia"],
    },
    NotificationTemplate {
        notification_type: NotificationType::UltimoAvisoExtrajudicial,
        label: "Último aviso extrajudicial",
        short_description: "Comunica etapa final antes de medidas judiciais/protesto.",
        default_title: "Último aviso extrajudicial",
        default_body: r#"Prezado(a) {nome_destinatario},

Apesar dos avisos anteriores, permanecem pendentes as obrigações relacionadas ao imóvel em {endereco_imovel}.

Este é o último aviso extrajudicial antes do encaminhamento para protesto ou medidas judiciais cabíveis. Regularize em até {prazo_dias} dias ou apresente proposta formal."#,
        recommended_channel: RecommendedChannel::Cartorio,
        tags: &["cobranca", "extrajudicial", "prazo final"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_has_exactly_one_template() {
        for t in NotificationType::ALL {
            let count = NOTIFICATION_TEMPLATES
                .iter()
                .filter(|tpl| tpl.notification_type == t)
                .count();
            assert_eq!(count, 1, "{t}");
        }
    }

    #[test]
    fn overdue_rent_template_uses_whatsapp() {
        let tpl = find_template(NotificationType::CobrancaAluguelEmAtraso).unwrap();
        assert_eq!(tpl.recommended_channel, RecommendedChannel::Whatsapp);
        assert!(tpl.default_body.contains("{nome_locatario}"));
    }
}
