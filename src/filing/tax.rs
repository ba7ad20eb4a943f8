use rust_decimal::{Decimal, RoundingStrategy};

use taxsetu_api::filings::itr::{ItrFormData, ItrComputation};
use taxsetu_api::filings::gst::{GstFormData, GstComputation};

/// everything below here is pure arithmetic over the submitted form data.
/// identical input always produces identical output

fn rupees(value: i64) -> Decimal {
    Decimal::from(value)
}

/// half-up to paise
fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn floor_zero(value: Decimal) -> Decimal {
    if value.is_sign_negative() {
        Decimal::ZERO
    } else {
        value
    }
}

pub const STANDARD_DEDUCTION: i64 = 50_000;
pub const DEDUCTION_80C_CAP: i64 = 150_000;
pub const DEDUCTION_80D_CAP: i64 = 25_000;
pub const HOME_LOAN_INTEREST_CAP: i64 = 200_000;
pub const REBATE_87A_INCOME_CAP: i64 = 500_000;
pub const REBATE_87A_MAX: i64 = 12_500;

/// old regime slab breakpoints with the marginal rate applied above each
fn itr_slabs() -> [(Decimal, Decimal); 3] {
    [
        (rupees(250_000), Decimal::new(5, 2)),
        (rupees(500_000), Decimal::new(20, 2)),
        (rupees(1_000_000), Decimal::new(30, 2)),
    ]
}

fn cess_rate() -> Decimal {
    Decimal::new(4, 2)
}

/// marginal slab walk over taxable income
pub fn slab_tax(taxable: Decimal) -> Decimal {
    let slabs = itr_slabs();
    let mut tax = Decimal::ZERO;

    for (index, (floor, rate)) in slabs.iter().enumerate() {
        if taxable <= *floor {
            break;
        }

        let ceiling = slabs.get(index + 1).map(|(next, _)| *next);

        let upper = match ceiling {
            Some(next) if taxable > next => next,
            _ => taxable
        };

        tax += (upper - floor) * rate;
    }

    tax
}

pub fn compute_itr(form: &ItrFormData) -> ItrComputation {
    let gross_income = form.salary_income
        + form.business_income
        + form.capital_gains
        + form.other_income;

    // the standard deduction only offsets salary income
    let standard_deduction = form.salary_income.min(rupees(STANDARD_DEDUCTION));

    let total_deductions = form.deduction_80c.min(rupees(DEDUCTION_80C_CAP))
        + form.deduction_80d.min(rupees(DEDUCTION_80D_CAP))
        + form.home_loan_interest.min(rupees(HOME_LOAN_INTEREST_CAP));

    let taxable_income = floor_zero(gross_income - standard_deduction - total_deductions);

    let slab = slab_tax(taxable_income);

    let rebate = if taxable_income <= rupees(REBATE_87A_INCOME_CAP) {
        slab.min(rupees(REBATE_87A_MAX))
    } else {
        Decimal::ZERO
    };

    let cess = (slab - rebate) * cess_rate();
    let total_tax = round_money(slab - rebate + cess);

    let tax_payable = round_money(floor_zero(total_tax - form.tds_deducted));
    let refund_due = round_money(floor_zero(form.tds_deducted - total_tax));

    ItrComputation {
        gross_income: round_money(gross_income),
        standard_deduction: round_money(standard_deduction),
        total_deductions: round_money(total_deductions),
        taxable_income: round_money(taxable_income),
        slab_tax: round_money(slab),
        rebate: round_money(rebate),
        cess: round_money(cess),
        total_tax,
        tds_deducted: round_money(form.tds_deducted),
        tax_payable,
        refund_due,
    }
}

/// the GST rate slabs in force. used to sanity check rate driven splits
pub fn gst_rate_slabs() -> [Decimal; 5] {
    [
        Decimal::ZERO,
        Decimal::new(5, 2),
        Decimal::new(12, 2),
        Decimal::new(18, 2),
        Decimal::new(28, 2),
    ]
}

/// tax on a taxable value at one of the fixed slab rates. intra-state
/// supplies split the levy evenly between CGST and SGST, inter-state
/// supplies charge the whole levy as IGST
pub fn split_rate(
    taxable_value: Decimal,
    rate: Decimal,
    interstate: bool
) -> Option<(Decimal, Decimal, Decimal)> {
    if !gst_rate_slabs().contains(&rate) {
        return None;
    }

    let levy = taxable_value * rate;

    if interstate {
        Some((Decimal::ZERO, Decimal::ZERO, round_money(levy)))
    } else {
        let half = round_money(levy / Decimal::from(2));

        Some((half, half, Decimal::ZERO))
    }
}

/// GSTR-3B style netting: input tax credit offsets output tax per head,
/// never below zero
pub fn compute_gst(form: &GstFormData) -> GstComputation {
    let output_tax_total = form.outward_cgst + form.outward_sgst + form.outward_igst;
    let itc_total = form.itc_cgst + form.itc_sgst + form.itc_igst;

    let payable_cgst = round_money(floor_zero(form.outward_cgst - form.itc_cgst));
    let payable_sgst = round_money(floor_zero(form.outward_sgst - form.itc_sgst));
    let payable_igst = round_money(floor_zero(form.outward_igst - form.itc_igst));

    let total_payable = payable_cgst + payable_sgst + payable_igst;

    GstComputation {
        output_tax_total: round_money(output_tax_total),
        itc_total: round_money(itc_total),
        payable_cgst,
        payable_sgst,
        payable_igst,
        total_payable,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn itr_form(salary: i64, deduction_80c: i64, tds: i64) -> ItrFormData {
        ItrFormData {
            salary_income: rupees(salary),
            deduction_80c: rupees(deduction_80c),
            tds_deducted: rupees(tds),
            ..Default::default()
        }
    }

    #[test]
    fn salaried_with_80c() {
        // 12,00,000 salary less 50,000 standard and 1,50,000 under 80C
        // leaves exactly 10,00,000 taxable
        let computed = compute_itr(&itr_form(1_200_000, 150_000, 0));

        assert_eq!(computed.taxable_income, rupees(1_000_000));
        assert_eq!(computed.slab_tax, rupees(112_500));
        assert_eq!(computed.rebate, Decimal::ZERO);
        assert_eq!(computed.cess, rupees(4_500));
        assert_eq!(computed.total_tax, rupees(117_000));
        assert_eq!(computed.tax_payable, rupees(117_000));
        assert_eq!(computed.refund_due, Decimal::ZERO);
    }

    #[test]
    fn rebate_wipes_small_liability() {
        // taxable lands at 4,50,000, slab tax 10,000, fully rebated
        let computed = compute_itr(&itr_form(500_000, 0, 0));

        assert_eq!(computed.taxable_income, rupees(450_000));
        assert_eq!(computed.slab_tax, rupees(10_000));
        assert_eq!(computed.rebate, rupees(10_000));
        assert_eq!(computed.total_tax, Decimal::ZERO);
    }

    #[test]
    fn rebate_cuts_off_above_five_lakh() {
        let computed = compute_itr(&itr_form(600_000, 0, 0));

        assert_eq!(computed.taxable_income, rupees(550_000));
        assert_eq!(computed.rebate, Decimal::ZERO);
        // 12,500 + 10,000 at twenty percent, plus cess
        assert_eq!(computed.slab_tax, rupees(22_500));
        assert_eq!(computed.total_tax, rupees(23_400));
    }

    #[test]
    fn deduction_caps_apply() {
        let form = ItrFormData {
            salary_income: rupees(2_000_000),
            deduction_80c: rupees(300_000),
            deduction_80d: rupees(60_000),
            home_loan_interest: rupees(350_000),
            ..Default::default()
        };

        let computed = compute_itr(&form);

        assert_eq!(
            computed.total_deductions,
            rupees(DEDUCTION_80C_CAP + DEDUCTION_80D_CAP + HOME_LOAN_INTEREST_CAP)
        );
    }

    #[test]
    fn tds_refund() {
        let computed = compute_itr(&itr_form(1_200_000, 150_000, 150_000));

        assert_eq!(computed.tax_payable, Decimal::ZERO);
        assert_eq!(computed.refund_due, rupees(33_000));
    }

    #[test]
    fn deductions_never_push_taxable_negative() {
        let computed = compute_itr(&itr_form(100_000, 150_000, 0));

        assert_eq!(computed.taxable_income, Decimal::ZERO);
        assert_eq!(computed.total_tax, Decimal::ZERO);
    }

    #[test]
    fn no_precision_loss_on_paise() {
        let form = ItrFormData {
            salary_income: "1200000.55".parse().unwrap(),
            ..Default::default()
        };

        let computed = compute_itr(&form);

        assert_eq!(computed.gross_income, "1200000.55".parse::<Decimal>().unwrap());
    }

    #[test]
    fn slab_walk_table() {
        let cases = [
            (0, 0),
            (250_000, 0),
            (250_001, 0),     // rounds below a rupee
            (500_000, 12_500),
            (750_000, 62_500),
            (1_000_000, 112_500),
            (1_500_000, 262_500),
        ];

        for (taxable, expected) in cases {
            let tax = slab_tax(rupees(taxable))
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

            assert_eq!(tax, rupees(expected), "taxable {taxable}");
        }
    }

    #[test]
    fn gst_netting_floors_at_zero_per_head() {
        let form = GstFormData {
            outward_cgst: rupees(9_000),
            outward_sgst: rupees(9_000),
            outward_igst: rupees(1_000),
            itc_cgst: rupees(4_000),
            itc_sgst: rupees(12_000),
            itc_igst: rupees(500),
            ..Default::default()
        };

        let computed = compute_gst(&form);

        assert_eq!(computed.payable_cgst, rupees(5_000));
        // excess SGST credit does not go negative
        assert_eq!(computed.payable_sgst, Decimal::ZERO);
        assert_eq!(computed.payable_igst, rupees(500));
        assert_eq!(computed.total_payable, rupees(5_500));
    }

    #[test]
    fn gst_split_by_rate() {
        let (cgst, sgst, igst) = split_rate(rupees(10_000), Decimal::new(18, 2), false)
            .expect("18 percent is a valid slab");

        assert_eq!(cgst, rupees(900));
        assert_eq!(sgst, rupees(900));
        assert_eq!(igst, Decimal::ZERO);

        let (cgst, sgst, igst) = split_rate(rupees(10_000), Decimal::new(18, 2), true)
            .expect("18 percent is a valid slab");

        assert_eq!(cgst, Decimal::ZERO);
        assert_eq!(sgst, Decimal::ZERO);
        assert_eq!(igst, rupees(1_800));
    }

    #[test]
    fn gst_rejects_off_slab_rate() {
        assert!(split_rate(rupees(10_000), Decimal::new(15, 2), false).is_none());
    }
}
