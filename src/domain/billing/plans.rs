//! Paid plans sold through the checkout

use super::plan_limits::PlanType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingPlan {
    pub id: &'static str,
    pub title: &'static str,
    pub price_cents: i64,
    pub currency: &'static str,
    pub interval: &'static str,
    /// Quota tier granted while the subscription is active.
    pub tier: PlanType,
}

pub const PLANS: &[BillingPlan] = &[
    BillingPlan {
        id: "basic_monthly",
        title: "Imobi Contract Basic Mensal",
        price_cents: 4990,
        currency: "BRL",
        interval: "month",
        tier: PlanType::Starter,
    },
    BillingPlan {
        id: "pro_monthly",
        title: "Imobi Contract Pro Mensal",
        price_cents: 9700,
        currency: "BRL",
        interval: "month",
        tier: PlanType::Pro,
    },
];

pub fn resolve_plan(id: &str) -> Option<&'static BillingPlan> {
    PLANS.iter().find(|plan| plan.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_plans_only() {
        let pro = resolve_plan("pro_monthly").unwrap();
        assert_eq!(pro.price_cents, 9700);
        assert_eq!(pro.tier, PlanType::Pro);
        assert!(resolve_plan("gold").is_none());
    }
}
