//! 规则分类器: 聚合特征 + 人口学信息 → 诊断.
//!
//! 分类过程完全由 [`RuleSet`] 数据驱动, 是确定性的全函数.

mod rules;

pub use rules::{
    AgeTier, Band, FeatureRule, GenderRule, Icd10, ModalityWeight, RuleSet, Test, Tier,
    MISSING_ICD10,
};

use crate::features::{AggregateFeatures, FeatureVector};
use crate::{Gender, Modality};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 临床诊断标签 (封闭集合).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// 未见异常.
    Normal,
    /// 轻度心肌病.
    MildCardiomyopathy,
    /// 冠状动脉疾病.
    CoronaryArteryDisease,
    /// 心律失常.
    Arrhythmia,
    /// 心肌病.
    Cardiomyopathy,
    /// 心肌梗死.
    MyocardialInfarction,
    /// 心力衰竭.
    HeartFailure,
}

impl Condition {
    /// 全部标签.
    pub const ALL: [Condition; 7] = [
        Condition::Normal,
        Condition::MildCardiomyopathy,
        Condition::CoronaryArteryDisease,
        Condition::Arrhythmia,
        Condition::Cardiomyopathy,
        Condition::MyocardialInfarction,
        Condition::HeartFailure,
    ];

    /// snake_case 标签名, 与报告 JSON 中的 `condition_diagnosed` 一致.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Condition::Normal => "normal",
            Condition::MildCardiomyopathy => "mild_cardiomyopathy",
            Condition::CoronaryArteryDisease => "coronary_artery_disease",
            Condition::Arrhythmia => "arrhythmia",
            Condition::Cardiomyopathy => "cardiomyopathy",
            Condition::MyocardialInfarction => "myocardial_infarction",
            Condition::HeartFailure => "heart_failure",
        }
    }

    /// 供打印的标题形式, 如 `Coronary Artery Disease`.
    pub fn title(&self) -> String {
        self.as_str()
            .split('_')
            .map(|w| {
                let mut cs = w.chars();
                match cs.next() {
                    Some(c) => c.to_uppercase().chain(cs).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// 分类结果.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// 诊断标签.
    pub condition: Condition,
    /// ICD-10 编码.
    pub icd10_code: String,
    /// 累计风险分.
    pub risk_score: f64,
    /// 所用规则集版本.
    pub rule_set: String,
}

impl Diagnosis {
    fn from_score(risk_score: f64, rules: &RuleSet) -> Self {
        let condition = rules.condition_for(risk_score);
        Self {
            condition,
            icd10_code: rules
                .icd10_for(condition)
                .unwrap_or(MISSING_ICD10)
                .to_string(),
            risk_score,
            rule_set: rules.version.clone(),
        }
    }
}

/// 对一组切片特征分类. 特征先逐字段求平均.
///
/// `features` 为空时均值为 NaN, 所有特征规则都不成立, 只有人口学信息计分.
pub fn classify(
    features: &[FeatureVector],
    age: u32,
    gender: Gender,
    modality: Modality,
    rules: &RuleSet,
) -> Diagnosis {
    let means = FeatureVector::field_mean(features);
    Diagnosis::from_score(rules.score_means(&means, age, gender, modality), rules)
}

/// 对已聚合的特征分类.
pub fn classify_aggregate(
    features: &AggregateFeatures,
    age: u32,
    gender: Gender,
    modality: Modality,
    rules: &RuleSet,
) -> Diagnosis {
    Diagnosis::from_score(rules.score(features, age, gender, modality), rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(contrast: f64, entropy: f64, cardiac_area: f64, symmetry: f64) -> FeatureVector {
        FeatureVector {
            mean_intensity: 0.4,
            std_intensity: 0.2,
            max_intensity: contrast,
            min_intensity: 0.0,
            contrast,
            entropy,
            homogeneity: 0.8,
            cardiac_area,
            symmetry_score: symmetry,
        }
    }

    #[test]
    fn test_high_risk_scenario() {
        let f = [features(0.75, 5.5, 0.25, 0.5)];
        let d = classify(&f, 70, Gender::Male, Modality::Ct, RuleSet::canonical());
        assert!((d.risk_score - 0.95).abs() < 1e-9);
        assert_eq!(d.condition, Condition::MyocardialInfarction);
        assert_eq!(d.icd10_code, "I21");
        assert_eq!(d.rule_set, "v1");
    }

    #[test]
    fn test_low_risk_scenario() {
        let f = [features(0.3, 2.0, 0.2, 0.9)];
        let d = classify(&f, 30, Gender::Female, Modality::Mri, RuleSet::canonical());
        assert_eq!(d.risk_score, 0.1);
        assert_eq!(d.condition, Condition::Normal);
        assert_eq!(d.icd10_code, "Z00");
    }

    #[test]
    fn test_averages_before_scoring() {
        // 单看第一张 contrast > 0.7, 但平均后不成立.
        let f = [features(0.9, 2.0, 0.2, 0.9), features(0.3, 2.0, 0.2, 0.9)];
        let d = classify(&f, 30, Gender::Female, Modality::Ct, RuleSet::canonical());
        assert_eq!(d.risk_score, 0.05);

        let agg = AggregateFeatures::from_vectors(&f).unwrap();
        assert_eq!(
            classify_aggregate(&agg, 30, Gender::Female, Modality::Ct, RuleSet::canonical()),
            d
        );
    }

    #[test]
    fn test_deterministic() {
        let f = [features(0.6, 5.1, 0.05, 0.7), features(0.8, 4.9, 0.5, 0.4)];
        let a = classify(&f, 50, Gender::Male, Modality::Mri, RuleSet::canonical());
        for _ in 0..10 {
            assert_eq!(classify(&f, 50, Gender::Male, Modality::Mri, RuleSet::canonical()), a);
        }
    }

    #[test]
    fn test_empty_features_score_demographics_only() {
        let d = classify(&[], 70, Gender::Male, Modality::Ct, RuleSet::canonical());
        assert!((d.risk_score - 0.35).abs() < 1e-9);
        assert_eq!(d.condition, Condition::CoronaryArteryDisease);
    }

    #[test]
    fn test_synthetic_tuned_set() {
        let rs = RuleSet::synthetic_tuned();
        // contrast > 0.25 (+0.3), entropy > 5.5 (+0.3), age > 65 (+0.3), M & age > 45 (+0.1).
        let f = [features(0.5, 6.0, 0.3, 0.9)];
        let d = classify(&f, 70, Gender::Male, Modality::Ct, rs);
        assert!((d.risk_score - 1.0).abs() < 1e-9);
        assert_eq!(d.condition, Condition::HeartFailure);
        assert_eq!(d.icd10_code, "I50");
        assert_eq!(d.rule_set, "v2-synthetic");

        // entropy < 3 (+0.1), contrast 0.2 不计分, F & age <= 55.
        let f = [features(0.2, 2.0, 0.3, 0.9)];
        let d = classify(&f, 50, Gender::Female, Modality::Mri, rs);
        assert!((d.risk_score - 0.3).abs() < 1e-9);
        assert_eq!(d.icd10_code.as_str(), rs.icd10_for(d.condition).unwrap());
    }

    #[test]
    fn test_title() {
        assert_eq!(Condition::CoronaryArteryDisease.title(), "Coronary Artery Disease");
        assert_eq!(Condition::Normal.title(), "Normal");
        for c in Condition::ALL {
            let json = serde_json::to_string(&c).unwrap();
            assert_eq!(json, format!("\"{}\"", c.as_str()));
        }
    }
}
