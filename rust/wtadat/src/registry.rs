//! The static registry of known classes, their display names, and the display
//! names of their fields. The tables must stay in sync with the file producer.
use crate::ClassCode;

/// A known class of table found in data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassDef {
    /// The class code as stored in class headers.
    pub code: ClassCode,
    /// The display name of the class.
    pub name: &'static str,
    /// Field codes and their display names.
    pub fields: &'static [(i64, &'static str)],
}

impl ClassDef {
    /// Returns the display name of the field with `field_code`.
    ///
    /// # Errors
    /// This function returns [`Error::Lookup`](crate::Error::Lookup) if the class
    /// has no such field.
    pub fn field_name(&self, field_code: i64) -> crate::Result<&'static str> {
        self.fields
            .iter()
            .find(|(code, _)| *code == field_code)
            .map(|(_, name)| *name)
            .ok_or(crate::Error::Lookup {
                class_code: self.code,
                field_code: Some(field_code),
            })
    }
}

/// Non-financial income statement.
pub const INCOME_STATEMENT: ClassCode = ClassCode(1001);
/// Non-financial cash-flow statement.
pub const CASH_FLOW_STATEMENT: ClassCode = ClassCode(1002);
/// Non-financial balance sheet.
pub const BALANCE_SHEET: ClassCode = ClassCode(1003);
/// Historical daily quotes.
pub const DAILY_QUOTES: ClassCode = ClassCode(1007);
/// Five-minute bars.
pub const FIVE_MINUTE_BARS: ClassCode = ClassCode(1008);

/// Every known class, in registry order.
pub static CLASSES: &[ClassDef] = &[
    ClassDef {
        code: BALANCE_SHEET,
        name: "非金融资产负债表",
        fields: BALANCE_SHEET_FIELDS,
    },
    ClassDef {
        code: CASH_FLOW_STATEMENT,
        name: "非金融现金表",
        fields: CASH_FLOW_FIELDS,
    },
    ClassDef {
        code: INCOME_STATEMENT,
        name: "非金融利润表",
        fields: INCOME_FIELDS,
    },
    ClassDef {
        code: DAILY_QUOTES,
        name: "历史行情",
        fields: DAILY_QUOTE_FIELDS,
    },
    ClassDef {
        code: FIVE_MINUTE_BARS,
        name: "五分钟数据",
        fields: FIVE_MINUTE_BAR_FIELDS,
    },
];

/// Returns the definition of the class with `class_code`.
///
/// # Errors
/// This function returns [`Error::Lookup`](crate::Error::Lookup) if the class isn't
/// in the registry.
pub fn class_def(class_code: ClassCode) -> crate::Result<&'static ClassDef> {
    CLASSES
        .iter()
        .find(|def| def.code == class_code)
        .ok_or(crate::Error::Lookup {
            class_code,
            field_code: None,
        })
}

/// Returns the display name of the class with `class_code`.
///
/// # Errors
/// This function returns [`Error::Lookup`](crate::Error::Lookup) if the class isn't
/// in the registry.
pub fn class_name(class_code: ClassCode) -> crate::Result<&'static str> {
    class_def(class_code).map(|def| def.name)
}

/// Returns the display name of field `field_code` of class `class_code`.
///
/// # Errors
/// This function returns [`Error::Lookup`](crate::Error::Lookup) if either the class
/// or the field isn't in the registry.
pub fn field_name(class_code: ClassCode, field_code: i64) -> crate::Result<&'static str> {
    class_def(class_code)?.field_name(field_code)
}

const BALANCE_SHEET_FIELDS: &[(i64, &str)] = &[
    (1003001, "证券简称"),
    (1003002, "证券代码"),
    (1003003, "机构名称"),
    (1003004, "公告日期"),
    (1003005, "截止日期"),
    (1003006, "报告年度"),
    (1003007, "合并类型编码"),
    (1003008, "合并类型"),
    (1003009, "报表来源编码"),
    (1003010, "报表来源"),
    (1003011, "货币资金"),
    (1003012, "结算备付金"),
    (1003013, "拆出资金"),
    (1003014, "以公允价值计量且其变动计入当期损益的金融资产(20190322弃用)"),
    (1003015, "衍生金融资产"),
    (1003016, "应收票据"),
    (1003017, "应收账款"),
    (1003018, "预付款项"),
    (1003019, "应收保费"),
    (1003020, "应收分保账款"),
    (1003021, "应收分保合同准备金"),
    (1003022, "其中：应收利息"),
    (1003023, "其中：应收股利"),
    (1003024, "其他应收款"),
    (1003025, "应收关联公司款"),
    (1003026, "买入返售金融资产"),
    (1003027, "存货"),
    (1003028, "其中：消耗性生物资产"),
    (1003029, "划分为持有待售的资产"),
    (1003030, "发放贷款及垫款-流动资产"),
    (1003031, "一年内到期的非流动资产"),
    (1003032, "交易性金融资产"),
    (1003033, "应收票据及应收账款"),
    (1003034, "合同资产"),
    (1003035, "其他流动资产"),
    (1003036, "流动资产合计"),
    (1003037, "发放贷款及垫款-非流动资产"),
    (1003038, "可供出售金融资产"),
    (1003039, "持有至到期投资"),
    (1003040, "长期应收款"),
    (1003041, "长期股权投资"),
    (1003042, "投资性房地产"),
    (1003043, "固定资产"),
    (1003044, "在建工程"),
    (1003045, "工程物资"),
    (1003046, "固定资产清理"),
    (1003047, "生产性生物资产"),
    (1003048, "油气资产"),
    (1003049, "无形资产"),
    (1003050, "开发支出"),
    (1003051, "商誉"),
    (1003052, "长期待摊费用"),
    (1003053, "递延所得税资产"),
    (1003054, "债权投资"),
    (1003055, "其他债权投资"),
    (1003056, "其他权益工具投资"),
    (1003057, "其他非流动金融资产"),
    (1003058, "其他非流动资产"),
    (1003059, "非流动资产合计"),
    (1003060, "资产总计"),
    (1003061, "短期借款"),
    (1003062, "向中央银行借款"),
    (1003063, "吸收存款及同业存放"),
    (1003064, "拆入资金"),
    (1003065, "以公允价值计量且其变动计入当期损益的金融负债（20190322弃用）"),
    (1003066, "衍生金融负债"),
    (1003067, "应付票据"),
    (1003068, "应付账款"),
    (1003069, "预收款项"),
    (1003070, "卖出回购金融资产款"),
    (1003071, "应付手续费及佣金"),
    (1003072, "应付职工薪酬"),
    (1003073, "应交税费"),
    (1003074, "其中：应付利息"),
    (1003075, "其中：应付股利"),
    (1003076, "其他应付款"),
    (1003077, "应付关联公司款"),
    (1003078, "应付分保账款"),
    (1003079, "保险合同准备金"),
    (1003080, "代理买卖证券款"),
    (1003081, "代理承销证券款"),
    (1003082, "划分为持有待售的负债"),
    (1003083, "一年内到期的非流动负债"),
    (1003084, "预计负债-流动负债"),
    (1003085, "递延收益-流动负债"),
    (1003086, "交易性金融负债"),
    (1003087, "应付票据及应付账款"),
    (1003088, "合同负债"),
    (1003089, "其他流动负债"),
    (1003090, "流动负债合计"),
    (1003091, "长期借款"),
    (1003092, "应付债券"),
    (1003093, "其中：优先股-非流动负债"),
    (1003094, "永续债-非流动负债"),
    (1003095, "长期应付款"),
    (1003096, "长期应付职工薪酬"),
    (1003097, "专项应付款"),
    (1003098, "预计负债"),
    (1003099, "递延收益-非流动负债"),
    (1003100, "递延所得税负债"),
    (1003101, "其他非流动负债"),
    (1003102, "非流动负债合计"),
    (1003103, "负债合计"),
    (1003104, "实收资本（或股本）"),
    (1003105, "其他权益工具"),
    (1003106, "其中：优先股-所有者权益"),
    (1003107, "永续债-所有者权益"),
    (1003108, "资本公积"),
    (1003109, "减：库存股"),
    (1003110, "其他综合收益"),
    (1003111, "专项储备"),
    (1003112, "盈余公积"),
    (1003113, "一般风险准备"),
    (1003114, "未分配利润"),
    (1003115, "外币报表折算价差"),
    (1003116, "归属于母公司所有者权益"),
    (1003117, "少数股东权益"),
    (1003118, "非正常经营项目收益调整"),
    (1003119, "所有者权益（或股东权益）合计"),
    (1003120, "负债和所有者（或股东权益）合计"),
    (1003121, "备注"),
    (1003122, "应收款项融资"),
    (1003123, "使用权资产"),
    (1003124, "租赁负债"),
];

const CASH_FLOW_FIELDS: &[(i64, &str)] = &[
    (1002001, "证券简称"),
    (1002002, "证券代码"),
    (1002003, "机构名称"),
    (1002004, "公告日期"),
    (1002005, "开始日期"),
    (1002006, "截止日期"),
    (1002007, "报告年度"),
    (1002008, "合并类型编码"),
    (1002009, "合并类型"),
    (1002010, "报表来源编码"),
    (1002011, "报表来源"),
    (1002012, "销售商品、提供劳务收到的现金"),
    (1002013, "客户存款和同业存放款项净增加额"),
    (1002014, "向中央银行借款净增加额"),
    (1002015, "向其他金融机构拆入资金净增加额"),
    (1002016, "收到原保险合同保费取得的现金"),
    (1002017, "收到再保险业务现金净额"),
    (1002018, "保户储金及投资款净增加额"),
    (1002019, "处置以公允价值计量且其变动计入当期损益的金融资产净增加额"),
    (1002020, "收取利息、手续费及佣金的现金"),
    (1002021, "拆入资金净增加额"),
    (1002022, "回购业务资金净增加额"),
    (1002023, "收到的税费返还"),
    (1002024, "收到其他与经营活动有关的现金"),
    (1002025, "经营活动现金流入小计"),
    (1002026, "购买商品、接受劳务支付的现金"),
    (1002027, "客户贷款及垫款净增加额"),
    (1002028, "存放中央银行和同业款项净增加额"),
    (1002029, "支付原保险合同赔付款项的现金"),
    (1002030, "支付利息、手续费及佣金的现金"),
    (1002031, "支付保单红利的现金"),
    (1002032, "支付给职工以及为职工支付的现金"),
    (1002033, "支付的各项税费"),
    (1002034, "支付其他与经营活动有关的现金"),
    (1002035, "经营活动现金流出小计"),
    (1002036, "经营活动产生的现金流量净额"),
    (1002037, "收回投资收到的现金"),
    (1002038, "取得投资收益收到的现金"),
    (1002039, "处置固定资产、无形资产和其他长期资产收回的现金净额"),
    (1002040, "处置子公司及其他营业单位收到的现金净额"),
    (1002041, "收到其他与投资活动有关的现金"),
    (1002042, "投资活动现金流入小计"),
    (1002043, "购建固定资产、无形资产和其他长期资产支付的现金"),
    (1002044, "投资支付的现金"),
    (1002045, "质押贷款净增加额"),
    (1002046, "取得子公司及其他营业单位支付的现金净额"),
    (1002047, "支付其他与投资活动有关的现金"),
    (1002048, "投资活动现金流出小计"),
    (1002049, "投资活动产生的现金流量净额"),
    (1002050, "吸收投资收到的现金"),
    (1002051, "其中：子公司吸收少数股东投资收到的现金"),
    (1002052, "取得借款收到的现金"),
    (1002053, "发行债券收到的现金"),
    (1002054, "收到其他与筹资活动有关的现金"),
    (1002055, "筹资活动现金流入小计"),
    (1002056, "偿还债务支付的现金"),
    (1002057, "分配股利、利润或偿付利息支付的现金"),
    (1002058, "其中：子公司支付给少数股东的股利、利润"),
    (1002059, "支付其他与筹资活动有关的现金"),
    (1002060, "筹资活动现金流出小计"),
    (1002061, "筹资活动产生的现金流量净额"),
    (1002062, "四、汇率变动对现金的影响"),
    (1002063, "四(2)、其他原因对现金的影响"),
    (1002064, "五、现金及现金等价物净增加额"),
    (1002065, "期初现金及现金等价物余额"),
    (1002066, "期末现金及现金等价物余额"),
    (1002067, "净利润"),
    (1002068, "加：资产减值准备"),
    (1002069, "固定资产折旧、油气资产折耗、生产性生物资产折旧"),
    (1002070, "投资性房地产的折旧及摊销"),
    (1002071, "无形资产摊销"),
    (1002072, "长期待摊费用摊销"),
    (1002073, "处置固定资产、无形资产和其他长期资产的损失"),
    (1002074, "固定资产报废损失"),
    (1002075, "公允价值变动损失"),
    (1002076, "财务费用"),
    (1002077, "投资损失"),
    (1002078, "递延所得税资产减少"),
    (1002079, "递延所得税负债增加"),
    (1002080, "存货的减少"),
    (1002081, "经营性应收项目的减少"),
    (1002082, "经营性应付项目的增加"),
    (1002083, "其他"),
    (1002084, "经营活动产生的现金流量净额2"),
    (1002085, "债务转为资本"),
    (1002086, "一年内到期的可转换公司债券"),
    (1002087, "融资租入固定资产"),
    (1002088, "现金的期末余额"),
    (1002089, "减：现金的期初余额"),
    (1002090, "加：现金等价物的期末余额"),
    (1002091, "减：现金等价物的期初余额"),
    (1002092, "加：其他原因对现金的影响2"),
    (1002093, "现金及现金等价物净增加额2"),
];

const INCOME_FIELDS: &[(i64, &str)] = &[
    (1001001, "证券代码"),
    (1001002, "证券简称"),
    (1001003, "机构名称"),
    (1001004, "公告日期"),
    (1001005, "开始日期"),
    (1001006, "截止日期"),
    (1001007, "报告年度"),
    (1001008, "合并类型编码"),
    (1001009, "合并类型"),
    (1001010, "报表来源编码"),
    (1001011, "报表来源"),
    (1001012, "一、营业总收入"),
    (1001013, "其中：营业收入"),
    (1001014, "利息收入"),
    (1001015, "已赚保费"),
    (1001016, "手续费及佣金收入"),
    (1001017, "二、营业总成本"),
    (1001018, "其中：营业成本"),
    (1001019, "利息支出"),
    (1001020, "手续费及佣金支出"),
    (1001021, "退保金"),
    (1001022, "赔付支出净额"),
    (1001023, "提取保险合同准备金净额"),
    (1001024, "保单红利支出"),
    (1001025, "分保费用"),
    (1001026, "营业税金及附加"),
    (1001027, "销售费用"),
    (1001028, "管理费用"),
    (1001029, "勘探费用"),
    (1001030, "财务费用"),
    (1001031, "研发费用"),
    (1001032, "资产减值损失"),
    (1001033, "加：公允价值变动净收益"),
    (1001034, "投资收益"),
    (1001035, "其中：对联营企业和合营企业的投资收益"),
    (1001036, "汇兑收益"),
    (1001037, "其它收入"),
    (1001038, "信用减值损失"),
    (1001039, "净敞口套期收益"),
    (1001040, "资产处置收益"),
    (1001041, "影响营业利润的其他科目"),
    (1001042, "三、营业利润"),
    (1001043, "加：补贴收入"),
    (1001044, "营业外收入"),
    (1001045, "其中：非流动资产处置利得"),
    (1001046, "减：营业外支出"),
    (1001047, "其中：非流动资产处置损失"),
    (1001048, "加：影响利润总额的其他科目"),
    (1001049, "四、利润总额"),
    (1001050, "减：所得税"),
    (1001051, "加：影响净利润的其他科目"),
    (1001052, "五、净利润"),
    (1001053, "持续经营净利润"),
    (1001054, "终止经营净利润"),
    (1001055, "归属于母公司所有者的净利润"),
    (1001056, "少数股东损益"),
    (1001057, "（一）基本每股收益"),
    (1001058, "（二）稀释每股收益"),
    (1001059, "七、其他综合收益"),
    (1001060, "八、综合收益总额"),
    (1001061, "其中：归属于母公司"),
    (1001062, "其中：归属于少数股东"),
    (1001063, "备注"),
    (1001064, "其中：利息费用"),
    (1001065, "其中：利息收入"),
    (1001066, "信用减值损失（2019格式）"),
    (1001067, "资产减值损失（2019格式）"),
];

const DAILY_QUOTE_FIELDS: &[(i64, &str)] = &[
    (1007001, "data"),
    (1007002, "high"),
    (1007003, "vol2"),
    (1007004, "open"),
    (1007005, "low"),
    (1007006, "turnover"),
    (1007007, "Amplitude"),
    (1007008, "p_change"),
    (1007009, "close"),
    (1007010, "date"),
    (1007011, "volume"),
    (1007012, "name"),
    (1007013, "code"),
    (1007014, "fqt"),
    (1007015, "type"),
    (1007016, "is_dapan"),
];

const FIVE_MINUTE_BAR_FIELDS: &[(i64, &str)] = &[
    (1008004, "high"),
    (1008007, "vol2"),
    (1008002, "open"),
    (1008005, "low"),
    (1008008, "turnover"),
    (1008009, "Amplitude"),
    (1008010, "p_change"),
    (1008003, "close"),
    (1008001, "date"),
    (1008006, "volume"),
];
#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(INCOME_STATEMENT, "非金融利润表", 67)]
    #[case(CASH_FLOW_STATEMENT, "非金融现金表", 93)]
    #[case(BALANCE_SHEET, "非金融资产负债表", 124)]
    #[case(DAILY_QUOTES, "历史行情", 16)]
    #[case(FIVE_MINUTE_BARS, "五分钟数据", 10)]
    fn test_class_def(#[case] code: ClassCode, #[case] name: &str, #[case] field_count: usize) {
        let def = class_def(code).unwrap();
        assert_eq!(def.name, name);
        assert_eq!(def.fields.len(), field_count);
    }

    #[test]
    fn test_field_codes_belong_to_class() {
        for def in CLASSES {
            for (field_code, _) in def.fields {
                assert_eq!(field_code / 1000, i64::from(def.code.0), "{field_code}");
            }
        }
    }

    #[test]
    fn test_field_codes_unique() {
        for def in CLASSES {
            let mut codes: Vec<_> = def.fields.iter().map(|(code, _)| *code).collect();
            codes.sort_unstable();
            codes.dedup();
            assert_eq!(codes.len(), def.fields.len(), "{}", def.code);
        }
    }

    #[rstest]
    #[case(DAILY_QUOTES, 1007002, "high")]
    #[case(DAILY_QUOTES, 1007009, "close")]
    #[case(FIVE_MINUTE_BARS, 1008001, "date")]
    #[case(INCOME_STATEMENT, 1001052, "五、净利润")]
    #[case(BALANCE_SHEET, 1003124, "租赁负债")]
    #[case(CASH_FLOW_STATEMENT, 1002093, "现金及现金等价物净增加额2")]
    fn test_field_name(#[case] class_code: ClassCode, #[case] field_code: i64, #[case] exp: &str) {
        assert_eq!(field_name(class_code, field_code).unwrap(), exp);
    }

    #[test]
    fn test_unknown_class() {
        assert!(matches!(
            class_name(ClassCode(1004)),
            Err(crate::Error::Lookup {
                class_code: ClassCode(1004),
                field_code: None
            })
        ));
    }

    #[test]
    fn test_unknown_field() {
        assert!(matches!(
            field_name(DAILY_QUOTES, 1007017),
            Err(crate::Error::Lookup {
                class_code: DAILY_QUOTES,
                field_code: Some(1007017)
            })
        ));
    }
}
